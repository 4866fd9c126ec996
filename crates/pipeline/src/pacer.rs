//! Per-channel pacing loop
//!
//! One loop per active source channel. Each tick releases at most
//! `groups_per_tick` groups (one by default), oldest first. Everything else
//! waits for later ticks, so a burst of albums is spread over time instead
//! of hitting the downstream transport at once.
//!
//! ```text
//!   Waiting ──tick──→ Draining ──groups left or released──→ Waiting
//!      │                  │
//!   cancel            buffer empty
//!      ↓                  ↓
//!   Terminated ←──────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use relay_routing::ChannelId;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::registry::{ChannelSlot, RegistryInner, Tick};

/// Default time between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of groups released per tick
pub const DEFAULT_GROUPS_PER_TICK: usize = 1;

/// Shortest tick interval a loop will run with
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Pacing configuration shared by every channel loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerConfig {
    /// Time between ticks
    pub interval: Duration,

    /// Groups released per channel per tick
    pub groups_per_tick: usize,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            groups_per_tick: DEFAULT_GROUPS_PER_TICK,
        }
    }
}

impl PacerConfig {
    /// Set the tick interval (clamped to `MIN_TICK_INTERVAL`)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    /// Set how many groups a tick may release (at least 1)
    pub fn with_groups_per_tick(mut self, groups: usize) -> Self {
        self.groups_per_tick = groups.max(1);
        self
    }
}

/// Run the pacing loop for one channel until its buffer empties or the
/// registry is cancelled
pub(crate) async fn run(inner: Arc<RegistryInner>, channel: ChannelId, slot: Arc<ChannelSlot>) {
    // public fields bypass the builder clamp
    let period = inner.config().interval.max(MIN_TICK_INTERVAL);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(channel_id = %channel, interval = ?period, "pacing loop started");

    loop {
        tokio::select! {
            biased;

            _ = inner.cancelled() => {
                let dropped = inner.retire_on_shutdown(channel, &slot);
                tracing::debug!(
                    channel_id = %channel,
                    dropped_groups = dropped,
                    "pacing loop cancelled"
                );
                break;
            }

            _ = ticker.tick() => {}
        }

        match inner.drain_tick(channel, &slot) {
            Tick::Released(groups) => {
                for group in groups {
                    inner.emit(channel, group);
                }
            }
            Tick::Terminated => {
                tracing::debug!(channel_id = %channel, "channel drained, pacing loop stopped");
                break;
            }
        }
    }

    inner.record_loop_terminated();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PacerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.groups_per_tick, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = PacerConfig::default()
            .with_interval(Duration::from_secs(2))
            .with_groups_per_tick(3);

        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.groups_per_tick, 3);
    }

    #[test]
    fn test_config_clamps() {
        let config = PacerConfig::default()
            .with_interval(Duration::ZERO)
            .with_groups_per_tick(0);

        assert_eq!(config.interval, Duration::from_millis(1));
        assert_eq!(config.groups_per_tick, 1);
    }
}
