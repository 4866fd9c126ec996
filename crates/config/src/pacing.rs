//! Pacing configuration
//!
//! How fast released albums are handed to the forwarder.
//!
//! # Defaults
//!
//! - `interval`: 5s
//! - `groups_per_tick`: 1
//!
//! One group per channel per tick keeps forwards well under provider rate
//! limits. Raising `groups_per_tick` trades that margin for latency under
//! bursts.

use serde::Deserialize;
use std::time::Duration;

/// Pacing configuration
///
/// # Example
///
/// ```toml
/// [pacing]
/// interval = "5s"
/// groups_per_tick = 1
/// ```
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    /// Time between ticks of each channel's loop
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Groups released per channel per tick
    /// Default: 1
    pub groups_per_tick: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            groups_per_tick: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PacingConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.groups_per_tick, 1);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: PacingConfig = toml::from_str("").unwrap();
        assert_eq!(config, PacingConfig::default());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
interval = "2s"
groups_per_tick = 3
"#;
        let config: PacingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.groups_per_tick, 3);
    }

    #[test]
    fn test_deserialize_interval_variants() {
        for (s, expected) in [
            ("500ms", Duration::from_millis(500)),
            ("5s", Duration::from_secs(5)),
            ("1m", Duration::from_secs(60)),
        ] {
            let toml = format!("interval = \"{}\"", s);
            let config: PacingConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config.interval, expected, "Failed for {}", s);
        }
    }

    #[test]
    fn test_invalid_interval() {
        assert!(toml::from_str::<PacingConfig>("interval = \"soon\"").is_err());
    }
}
