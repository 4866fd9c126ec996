//! Forward dispatcher - turns released groups into forward calls
//!
//! For each released group:
//!
//! 1. look up the destination in the routing table
//! 2. resolve source and destination access hashes
//! 3. build a `ForwardRequest` and hand it to the `Forwarder`
//!
//! Any failure is logged and counted, and the group is dropped. Nothing is
//! propagated back into the scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use relay_pipeline::{ReleaseHandler, ReleasedGroup};
use relay_routing::RoutingTable;

use crate::access::AccessHashStore;
use crate::error::{DispatchError, Endpoint, Result};
use crate::forwarder::{ForwardRequest, Forwarder, InputChannel};

/// Release handler that forwards groups to their destination channel
pub struct ForwardDispatcher<F> {
    routes: Arc<RoutingTable>,
    access: Arc<AccessHashStore>,
    forwarder: F,
    metrics: Arc<DispatchMetrics>,
}

impl<F: Forwarder> ForwardDispatcher<F> {
    /// Create a dispatcher over a routing table and access-hash store
    pub fn new(routes: Arc<RoutingTable>, access: Arc<AccessHashStore>, forwarder: F) -> Self {
        Self {
            routes,
            access,
            forwarder,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Get a metrics handle
    ///
    /// Remains valid after the dispatcher is moved into a registry.
    pub fn metrics_handle(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Resolve routing and credentials for a released group
    ///
    /// # Errors
    ///
    /// `Unrouted` if the source has no destination, `MissingAccessHash` if
    /// either side's hash is unknown (source is checked first).
    pub fn build_request(&self, released: &ReleasedGroup) -> Result<ForwardRequest> {
        let source = released.channel;
        let dest = self
            .routes
            .destination(source)
            .ok_or_else(|| DispatchError::unrouted(source))?;

        let from = self
            .access
            .get(source)
            .ok_or_else(|| DispatchError::missing_access_hash(source, Endpoint::Source))?;
        let to = self
            .access
            .get(dest)
            .ok_or_else(|| DispatchError::missing_access_hash(dest, Endpoint::Destination))?;

        Ok(ForwardRequest::new(
            InputChannel {
                id: source,
                access_hash: from,
            },
            InputChannel {
                id: dest,
                access_hash: to,
            },
            released.message_ids.clone(),
        ))
    }

    /// Forward one released group
    pub async fn dispatch(&self, released: &ReleasedGroup) -> Result<()> {
        let request = self.build_request(released)?;

        tracing::debug!(
            source = %request.from.id,
            destination = %request.to.id,
            messages = request.message_ids.len(),
            "forwarding group"
        );

        self.forwarder.forward(&request).await
    }
}

#[async_trait]
impl<F: Forwarder> ReleaseHandler for ForwardDispatcher<F> {
    async fn release(&self, group: ReleasedGroup) {
        match self.dispatch(&group).await {
            Ok(()) => self.metrics.record_forwarded(group.len() as u64),
            Err(e) => {
                self.metrics.record_error(&e);
                tracing::error!(
                    channel_id = %group.channel,
                    group_id = %group.group,
                    messages = group.len(),
                    error = %e,
                    "forward rejected"
                );
            }
        }
    }
}

impl<F> std::fmt::Debug for ForwardDispatcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardDispatcher")
            .field("routes", &self.routes.len())
            .field("known_channels", &self.access.len())
            .finish()
    }
}

/// Dispatch counters
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    groups_forwarded: AtomicU64,
    messages_forwarded: AtomicU64,
    unrouted: AtomicU64,
    missing_access_hash: AtomicU64,
    transport_errors: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            groups_forwarded: AtomicU64::new(0),
            messages_forwarded: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
            missing_access_hash: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    fn record_forwarded(&self, message_count: u64) {
        self.groups_forwarded.fetch_add(1, Ordering::Relaxed);
        self.messages_forwarded
            .fetch_add(message_count, Ordering::Relaxed);
    }

    #[inline]
    fn record_error(&self, error: &DispatchError) {
        let counter = match error {
            DispatchError::Unrouted { .. } => &self.unrouted,
            DispatchError::MissingAccessHash { .. } => &self.missing_access_hash,
            DispatchError::Transport(_) => &self.transport_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            groups_forwarded: self.groups_forwarded.load(Ordering::Relaxed),
            messages_forwarded: self.messages_forwarded.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            missing_access_hash: self.missing_access_hash.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Groups accepted by the forwarder
    pub groups_forwarded: u64,
    /// Messages in those groups
    pub messages_forwarded: u64,
    /// Groups dropped for lack of a destination
    pub unrouted: u64,
    /// Groups dropped for lack of an access hash
    pub missing_access_hash: u64,
    /// Groups the forwarder failed
    pub transport_errors: u64,
}

impl DispatchSnapshot {
    /// Total groups dropped for any reason
    #[inline]
    pub fn failed(&self) -> u64 {
        self.unrouted + self.missing_access_hash + self.transport_errors
    }
}
