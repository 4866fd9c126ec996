//! Configuration validation
//!
//! Checks that go beyond what serde can express. The destination map is
//! not checked here; it is validated when the routing table is built.

use std::collections::HashSet;

use crate::error::{ConfigError, Result};
use crate::Config;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_log(config)?;
    validate_pacing(config)?;
    validate_forwarding(config)?;
    validate_channels(config)?;
    Ok(())
}

fn validate_log(config: &Config) -> Result<()> {
    if config.log.level.trim().is_empty() {
        return Err(ConfigError::invalid_value(
            "log",
            "log",
            "level",
            "cannot be empty",
        ));
    }

    Ok(())
}

fn validate_pacing(config: &Config) -> Result<()> {
    if config.pacing.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "pacing",
            "pacing",
            "interval",
            "must be greater than zero",
        ));
    }

    if config.pacing.groups_per_tick == 0 {
        return Err(ConfigError::invalid_value(
            "pacing",
            "pacing",
            "groups_per_tick",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_forwarding(config: &Config) -> Result<()> {
    if config.forwarding.map_env.trim().is_empty() {
        return Err(ConfigError::invalid_value(
            "forwarding",
            "forwarding",
            "map_env",
            "cannot be empty",
        ));
    }

    Ok(())
}

fn validate_channels(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();

    for channel in &config.channels {
        if !seen.insert(channel.id) {
            return Err(ConfigError::duplicate_channel(channel.id));
        }
    }

    Ok(())
}
