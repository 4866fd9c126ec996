//! Group registry - accumulator plus pacing-loop supervisor
//!
//! The registry owns one `ChannelSlot` per active source channel. A slot
//! holds the channel's buffer behind its own lock, so registrations on
//! unrelated channels never contend beyond the O(1) map lookup.
//!
//! # Slot lifecycle
//!
//! - created by the first registration for a channel, together with the
//!   channel's pacing loop (both under the map lock, so exactly one loop per
//!   live slot)
//! - retired by its own loop, under the map lock and then the slot lock,
//!   once a tick finds the buffer empty (or on shutdown)
//! - a registration that races with retirement sees the `retired` flag and
//!   retries against a fresh slot, so no append is ever lost
//!
//! Lock order is always map, then slot.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use relay_routing::{ChannelId, GroupId, MessageId};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::group::{ChannelBuffer, PendingGroup, Timestamp};
use crate::metrics::{SchedulerMetrics, SchedulerSnapshot};
use crate::pacer::{self, PacerConfig};
use crate::release::{ReleaseHandler, ReleasedGroup};

/// Accumulates messages per channel and group, and releases them through
/// per-channel pacing loops
///
/// Cheap to clone; all clones share the same state.
///
/// # Example
///
/// ```ignore
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let registry = GroupRegistry::new(tx, PacerConfig::default(), CancellationToken::new());
///
/// registry.register(ChannelId::new(5), GroupId::new(9), MessageId::new(11), 0);
/// registry.register(ChannelId::new(5), GroupId::new(9), MessageId::new(12), 1);
///
/// // one tick later
/// let released = rx.recv().await.unwrap();
/// assert_eq!(released.message_ids.len(), 2);
/// ```
#[derive(Clone)]
pub struct GroupRegistry {
    inner: Arc<RegistryInner>,
}

/// State shared between the registry handle and every pacing loop
pub(crate) struct RegistryInner {
    /// Live channel slots
    channels: Mutex<HashMap<ChannelId, Arc<ChannelSlot>>>,

    /// Receiver of released groups
    handler: Arc<dyn ReleaseHandler>,

    config: PacerConfig,

    /// Shared shutdown signal
    cancel: CancellationToken,

    /// Pacing loops and in-flight release tasks
    tasks: TaskTracker,

    /// Signalled whenever the last slot is retired
    idle: Notify,

    metrics: SchedulerMetrics,
}

/// One channel's buffer and its retirement flag
#[derive(Default)]
pub(crate) struct ChannelSlot {
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    buffer: ChannelBuffer,

    /// Set once the slot has been removed from the map
    retired: bool,
}

/// Outcome of one pacing tick
pub(crate) enum Tick {
    /// Groups removed from the buffer, oldest first
    Released(Vec<PendingGroup>),

    /// Buffer was empty; slot retired
    Terminated,
}

impl GroupRegistry {
    /// Create a registry that releases groups to `handler`
    ///
    /// Cancelling `cancel` stops every pacing loop without flushing.
    pub fn new<H>(handler: H, config: PacerConfig, cancel: CancellationToken) -> Self
    where
        H: ReleaseHandler,
    {
        Self::with_shared_handler(Arc::new(handler), config, cancel)
    }

    /// Create a registry from an already shared handler
    pub fn with_shared_handler(
        handler: Arc<dyn ReleaseHandler>,
        config: PacerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                channels: Mutex::new(HashMap::new()),
                handler,
                config,
                cancel,
                tasks: TaskTracker::new(),
                idle: Notify::new(),
                metrics: SchedulerMetrics::new(),
            }),
        }
    }

    /// Record a message observed on `channel`
    ///
    /// Starts the channel's pacing loop if the channel has none. Messages
    /// registered after shutdown are dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn register(
        &self,
        channel: ChannelId,
        group: GroupId,
        message: MessageId,
        seen_at: Timestamp,
    ) {
        if self.inner.cancel.is_cancelled() {
            tracing::trace!(
                channel_id = %channel,
                message_id = %message,
                "registry shut down, dropping message"
            );
            return;
        }

        loop {
            let Some(slot) = self.inner.slot_for(channel) else {
                tracing::trace!(
                    channel_id = %channel,
                    message_id = %message,
                    "registry shut down, dropping message"
                );
                return;
            };
            let mut state = slot.state.lock();
            if state.retired {
                // Lost the race with the loop retiring this slot
                continue;
            }

            let opened = state.buffer.append(group, message, seen_at);
            drop(state);

            self.inner.metrics.record_registered(opened);
            tracing::trace!(
                channel_id = %channel,
                group_id = %group,
                message_id = %message,
                opened,
                "message registered"
            );
            return;
        }
    }

    /// Check if a channel currently has a pacing loop
    pub fn is_active(&self, channel: ChannelId) -> bool {
        self.inner.channels.lock().contains_key(&channel)
    }

    /// Channels with a pacing loop, sorted
    pub fn active_channels(&self) -> Vec<ChannelId> {
        let mut channels: Vec<ChannelId> = self.inner.channels.lock().keys().copied().collect();
        channels.sort_unstable();
        channels
    }

    /// Number of groups waiting on a channel
    pub fn pending_groups(&self, channel: ChannelId) -> usize {
        let slot = self.inner.channels.lock().get(&channel).cloned();
        slot.map_or(0, |slot| slot.state.lock().buffer.len())
    }

    /// Check if no channel has a pacing loop
    pub fn is_idle(&self) -> bool {
        self.inner.channels.lock().is_empty()
    }

    /// Wait until every channel has drained and its loop has stopped
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Pacing configuration
    #[inline]
    pub fn config(&self) -> PacerConfig {
        self.inner.config
    }

    /// Snapshot of scheduler counters
    #[inline]
    pub fn metrics(&self) -> SchedulerSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Cancel every pacing loop and wait for loops and in-flight releases
    ///
    /// Groups still pending are dropped.
    pub async fn shutdown(&self) {
        {
            // no loop can be spawned between the cancel and the tracker close
            let _channels = self.inner.channels.lock();
            self.inner.cancel.cancel();
        }
        self.inner.tasks.close();
        self.inner.tasks.wait().await;

        let snapshot = self.metrics();
        tracing::info!(
            messages_registered = snapshot.messages_registered,
            groups_released = snapshot.groups_released,
            groups_dropped = snapshot.groups_dropped,
            "group registry stopped"
        );
    }
}

impl std::fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("active_channels", &self.inner.channels.lock().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl RegistryInner {
    /// Get the channel's slot, creating it and spawning its loop if absent
    ///
    /// Returns `None` once cancelled; no loop is spawned after that.
    fn slot_for(self: &Arc<Self>, channel: ChannelId) -> Option<Arc<ChannelSlot>> {
        let mut channels = self.channels.lock();
        if let Some(slot) = channels.get(&channel) {
            return Some(Arc::clone(slot));
        }
        if self.cancel.is_cancelled() {
            return None;
        }

        let slot = Arc::new(ChannelSlot::default());
        channels.insert(channel, Arc::clone(&slot));
        self.metrics.record_loop_started();
        self.tasks
            .spawn(pacer::run(Arc::clone(self), channel, Arc::clone(&slot)));
        Some(slot)
    }

    #[inline]
    pub(crate) fn config(&self) -> PacerConfig {
        self.config
    }

    pub(crate) async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Release the oldest groups, or retire the slot if there are none
    pub(crate) fn drain_tick(&self, channel: ChannelId, slot: &Arc<ChannelSlot>) -> Tick {
        let limit = self.config.groups_per_tick.max(1);
        {
            let mut state = slot.state.lock();
            if !state.buffer.is_empty() {
                return Tick::Released(state.buffer.take_oldest_n(limit));
            }
        }

        let mut channels = self.channels.lock();
        let mut state = slot.state.lock();
        if !state.buffer.is_empty() {
            // A registration slipped in between the two locks
            return Tick::Released(state.buffer.take_oldest_n(limit));
        }

        state.retired = true;
        self.remove_slot(&mut channels, channel, slot);
        Tick::Terminated
    }

    /// Retire the slot at shutdown, returning the number of dropped groups
    pub(crate) fn retire_on_shutdown(&self, channel: ChannelId, slot: &Arc<ChannelSlot>) -> usize {
        let mut channels = self.channels.lock();
        let mut state = slot.state.lock();
        state.retired = true;
        let dropped = state.buffer.len();
        state.buffer = ChannelBuffer::new();
        self.remove_slot(&mut channels, channel, slot);

        self.metrics.record_dropped(dropped as u64);
        dropped
    }

    fn remove_slot(
        &self,
        channels: &mut HashMap<ChannelId, Arc<ChannelSlot>>,
        channel: ChannelId,
        slot: &Arc<ChannelSlot>,
    ) {
        if channels
            .get(&channel)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            channels.remove(&channel);
        }
        if channels.is_empty() {
            self.idle.notify_waiters();
        }
    }

    /// Hand a group to the release handler on its own task
    pub(crate) fn emit(&self, channel: ChannelId, group: PendingGroup) {
        let released = ReleasedGroup {
            channel,
            group: group.group_id,
            message_ids: group.message_ids,
            first_seen: group.first_seen,
        };

        self.metrics.record_released(released.len() as u64);
        tracing::debug!(
            channel_id = %channel,
            group_id = %released.group,
            messages = released.len(),
            "group released"
        );

        let handler = Arc::clone(&self.handler);
        self.tasks.spawn(async move {
            handler.release(released).await;
        });
    }

    #[inline]
    pub(crate) fn record_loop_terminated(&self) {
        self.metrics.record_loop_terminated();
    }
}
