//! Relay - Pipeline
//!
//! Groups inbound messages into albums per source channel and releases the
//! albums at a fixed pace.
//!
//! # Architecture
//!
//! ```text
//! [Inbound feed]            [GroupRegistry]                    [Handler]
//!   register() ──→ channel slot ──→ ChannelBuffer ──┐
//!                  (lazy, 1 loop      group → msgs  │  pacing tick
//!                   per channel)                    ↓  (oldest group)
//!                                      pacing loop ──→ spawn ──→ ReleaseHandler
//! ```
//!
//! # Key Design
//!
//! - **Per-channel locking**: each channel's buffer has its own lock; the
//!   shared map is only touched to find or retire a slot
//! - **Task per channel**: the first registration for a channel starts its
//!   pacing loop, the loop retires itself on the first tick that finds the
//!   buffer empty
//! - **Fixed budget per tick**: one group per tick by default, oldest
//!   `first_seen` first, to keep the forward rate below provider limits
//! - **One-way release**: the handler runs on its own task; the loop never
//!   waits on it and never sees its errors
//! - **No flush on shutdown**: cancellation drops pending groups
//!
//! # Example
//!
//! ```ignore
//! use relay_pipeline::{GroupRegistry, PacerConfig, handler_fn};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let registry = GroupRegistry::new(
//!     handler_fn(|group| tracing::info!(channel = %group.channel, "released")),
//!     PacerConfig::default(),
//!     cancel.clone(),
//! );
//!
//! registry.register(channel, group, message, date);
//!
//! // on shutdown
//! registry.shutdown().await;
//! ```

mod group;
mod metrics;
mod pacer;
mod registry;
mod release;

pub use group::{ChannelBuffer, PendingGroup, Timestamp};
pub use metrics::{SchedulerMetrics, SchedulerSnapshot};
pub use pacer::{DEFAULT_GROUPS_PER_TICK, DEFAULT_TICK_INTERVAL, MIN_TICK_INTERVAL, PacerConfig};
pub use registry::GroupRegistry;
pub use release::{FnHandler, ReleaseHandler, ReleasedGroup, handler_fn};

// Re-export identifier types for convenience
pub use relay_routing::{ChannelId, GroupId, MessageId};
