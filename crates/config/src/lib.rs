//! Relay Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config: 5s pacing, map from `FORWARD_MAP`.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use relay_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[pacing]\ninterval = \"2s\"").unwrap();
//! assert_eq!(config.pacing.interval.as_secs(), 2);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//!
//! [pacing]
//! interval = "5s"
//! groups_per_tick = 1
//!
//! [forwarding]
//! map = "-1001:-2001,-2002"
//!
//! [[channels]]
//! id = -2001
//! access_hash = 123456789
//! ```

mod channels;
mod error;
mod forwarding;
mod logging;
mod pacing;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use channels::ChannelConfig;
pub use error::{ConfigError, Result};
pub use forwarding::{DEFAULT_MAP_ENV, ForwardingConfig};
pub use logging::{DEFAULT_LOG_LEVEL, LogConfig, LogFormat, LogOutput};
pub use pacing::PacingConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Release pacing
    pub pacing: PacingConfig,

    /// Destination map source
    pub forwarding: ForwardingConfig,

    /// Channels with known access hashes
    pub channels: Vec<ChannelConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks for:
    /// - Non-zero pacing interval and at least one group per tick
    /// - A non-empty map variable name
    /// - Channels listed once
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Look up a configured channel by id
    pub fn channel(&self, id: i64) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.id == id)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
