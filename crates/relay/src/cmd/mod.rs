//! Command implementations for the relay CLI

pub mod channels;
pub mod check;
pub mod serve;


use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use relay_config::{Config, PacingConfig};
use relay_dispatch::{AccessHash, AccessHashStore};
use relay_pipeline::PacerConfig;
use relay_routing::{ChannelId, RoutingTable};
use tracing::info;

/// Paths tried when no `--config` is given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/relay.toml", "relay.toml"];

/// Load configuration
///
/// An explicit path must exist. Without one, the default paths are tried
/// and built-in defaults are used when none is present.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(anyhow::anyhow!("config file not found: {}", path.display()));
        }
        return Config::from_file(path).context("failed to load configuration");
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if candidate.exists() {
            return Config::from_file(&candidate).context("failed to load configuration");
        }
    }

    Ok(Config::default())
}

/// Resolve and parse the destination map
///
/// `Ok(None)` means no map is configured; a malformed map is an error.
pub fn load_routes(config: &Config) -> Result<Option<RoutingTable>> {
    let Some(map) = config.forwarding.resolve_map() else {
        return Ok(None);
    };

    let table = RoutingTable::parse(&map).with_context(|| {
        format!(
            "invalid destination map (from ${} or [forwarding].map)",
            config.forwarding.map_env
        )
    })?;

    info!(
        sources = table.len(),
        destinations = table.destinations().len(),
        "routing table built"
    );

    Ok(Some(table))
}

/// Seed an access hash store from `[[channels]]`
pub fn build_access_store(config: &Config) -> AccessHashStore {
    config
        .channels
        .iter()
        .map(|c| (ChannelId::new(c.id), AccessHash::new(c.access_hash)))
        .collect()
}

/// Channels in the table that have no known access hash, sorted
pub fn missing_access_hashes(routes: &RoutingTable, access: &AccessHashStore) -> Vec<ChannelId> {
    let mut missing: Vec<ChannelId> = routes
        .sources()
        .into_iter()
        .chain(routes.destinations())
        .filter(|channel| !access.contains(*channel))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

/// Map the `[pacing]` section onto the scheduler config
pub fn pacer_config(pacing: &PacingConfig) -> PacerConfig {
    PacerConfig::default()
        .with_interval(pacing.interval)
        .with_groups_per_tick(pacing.groups_per_tick)
}
