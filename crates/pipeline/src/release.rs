//! Release events and the handler contract
//!
//! A release is one-way: the scheduler removes a group from its buffer and
//! hands it to the handler exactly once, on a separate task. Nothing flows
//! back. Handlers own their failures (log and drop); a slow or failing
//! handler never stalls the pacing loop that released the group.

use async_trait::async_trait;
use relay_routing::{ChannelId, GroupId, MessageId};
use tokio::sync::mpsc;

use crate::group::Timestamp;

/// A group removed from its channel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedGroup {
    /// Source channel the messages were observed on
    pub channel: ChannelId,

    /// Album id of the group
    pub group: GroupId,

    /// Every message id accumulated for the group, in arrival order
    pub message_ids: Vec<MessageId>,

    /// Timestamp of the first message in the group
    pub first_seen: Timestamp,
}

impl ReleasedGroup {
    /// Number of messages in the group
    #[inline]
    pub fn len(&self) -> usize {
        self.message_ids.len()
    }

    /// Always false for groups coming out of the scheduler
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.message_ids.is_empty()
    }
}

/// Receiver of released groups
///
/// Called once per group on its own task. Implementations must not panic to
/// signal errors; log and return instead.
#[async_trait]
pub trait ReleaseHandler: Send + Sync + 'static {
    /// Handle one released group
    async fn release(&self, group: ReleasedGroup);
}

/// Adapter turning a plain closure into a `ReleaseHandler`
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a synchronous closure as a release handler
///
/// # Example
///
/// ```
/// use relay_pipeline::{handler_fn, ReleasedGroup};
///
/// let handler = handler_fn(|group: ReleasedGroup| {
///     println!("channel {} released {} messages", group.channel, group.len());
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(ReleasedGroup) + Send + Sync + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F> ReleaseHandler for FnHandler<F>
where
    F: Fn(ReleasedGroup) + Send + Sync + 'static,
{
    async fn release(&self, group: ReleasedGroup) {
        (self.f)(group);
    }
}

/// Forward released groups into a channel
///
/// A closed receiver drops the group with a warning.
#[async_trait]
impl ReleaseHandler for mpsc::UnboundedSender<ReleasedGroup> {
    async fn release(&self, group: ReleasedGroup) {
        if let Err(e) = self.send(group) {
            tracing::warn!(
                channel_id = %e.0.channel,
                messages = e.0.len(),
                "release receiver closed, dropping group"
            );
        }
    }
}
