//! Channels command - list channels with known access hashes
//!
//! With a valid destination map each channel is tagged with its role.

use anyhow::Result;
use relay_config::{ChannelConfig, Config};
use relay_routing::{ChannelId, RoutingTable};
use tracing::warn;

use super::load_routes;

/// Run the channels command
pub fn run(config: &Config) -> Result<()> {
    if config.channels.is_empty() {
        println!("no channels configured, add [[channels]] entries with id and access_hash");
        return Ok(());
    }

    // Roles are informational, a bad map should not hide the list
    let routes = match load_routes(config) {
        Ok(routes) => routes,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "ignoring destination map");
            None
        }
    };

    for channel in &config.channels {
        println!("{}", render(channel, routes.as_ref()));
    }

    Ok(())
}

fn render(channel: &ChannelConfig, routes: Option<&RoutingTable>) -> String {
    let id = ChannelId::new(channel.id);
    let role = match routes {
        Some(routes) => match routes.destination(id) {
            Some(dest) => format!("source -> {}", dest),
            None if routes.is_destination(id) => "destination".to_string(),
            None => "unrouted".to_string(),
        },
        None => "-".to_string(),
    };

    format!("{:>16}  {:<24}  {}", channel.id, channel.label(), role)
}
