//! Check command - validate the destination map
//!
//! Prints the canonical map and one line per destination. Exits non-zero
//! when the map is missing or malformed.

use anyhow::{Result, bail};
use relay_config::Config;
use relay_routing::{ChannelId, RoutingTable};

use super::{build_access_store, load_routes, missing_access_hashes};

/// Run the check command
pub fn run(config: &Config) -> Result<()> {
    let Some(routes) = load_routes(config)? else {
        bail!(
            "no destination map configured: set ${} or [forwarding].map",
            config.forwarding.map_env
        );
    };

    print!("{}", render(&routes));

    let access = build_access_store(config);
    let missing = missing_access_hashes(&routes, &access);
    if !missing.is_empty() {
        println!();
        println!("no access hash configured for:");
        for channel in missing {
            println!("  {}", channel);
        }
    }

    Ok(())
}

/// Canonical map followed by `dest <- src, src` lines, sorted by destination
fn render(routes: &RoutingTable) -> String {
    let mut out = format!("{}\n", routes);

    for dest in routes.destinations() {
        let sources: Vec<String> = routes
            .sources()
            .into_iter()
            .filter(|src| routes.destination(*src) == Some(dest))
            .map(|src: ChannelId| src.to_string())
            .collect();
        out.push_str(&format!("  {} <- {}\n", dest, sources.join(", ")));
    }

    out
}
