//! Serve command - forward message updates read from stdin
//!
//! Each input line is a `MessageEvent`. Messages from routed source
//! channels are registered with the group registry, which releases one
//! album per channel per tick to the forward dispatcher.
//!
//! Without a destination map there is nothing to forward: the known
//! channels are listed instead so a map can be written.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use relay_config::Config;
use relay_dispatch::{ForwardDispatcher, LogForwarder};
use relay_pipeline::GroupRegistry;
use relay_routing::RoutingTable;

use super::{build_access_store, channels, load_routes, missing_access_hashes, pacer_config};
use crate::event::parse_line;

/// Counters for one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines read, blank lines included
    pub lines: u64,
    /// Messages handed to the registry
    pub registered: u64,
    /// Messages from channels that are not routed
    pub skipped: u64,
    /// Lines that failed to parse
    pub malformed: u64,
}

/// Run the serve command
pub async fn run(config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        interval = ?config.pacing.interval,
        groups_per_tick = config.pacing.groups_per_tick,
        "relay starting"
    );

    let access = Arc::new(build_access_store(&config));

    let Some(routes) = load_routes(&config)? else {
        warn!(
            variable = %config.forwarding.map_env,
            "no destination map configured, listing known channels"
        );
        return channels::run(&config);
    };
    let routes = Arc::new(routes);

    for channel in missing_access_hashes(&routes, &access) {
        warn!(channel_id = %channel, "no access hash for routed channel, its groups will be dropped");
    }

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let dispatcher = ForwardDispatcher::new(Arc::clone(&routes), Arc::clone(&access), LogForwarder);
    let dispatch_metrics = dispatcher.metrics_handle();
    let registry = GroupRegistry::new(dispatcher, pacer_config(&config.pacing), cancel.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = ingest(stdin, &registry, &routes, &cancel)
        .await
        .context("failed to read updates")?;

    info!(
        lines = stats.lines,
        registered = stats.registered,
        skipped = stats.skipped,
        malformed = stats.malformed,
        "input finished"
    );

    if !cancel.is_cancelled() {
        info!(
            channels = registry.active_channels().len(),
            "draining pending groups"
        );
        tokio::select! {
            _ = registry.wait_idle() => {}
            _ = cancel.cancelled() => {
                info!("shutdown signal received, dropping pending groups");
            }
        }
    }

    registry.shutdown().await;

    let dispatched = dispatch_metrics.snapshot();
    info!(
        groups_forwarded = dispatched.groups_forwarded,
        messages_forwarded = dispatched.messages_forwarded,
        groups_failed = dispatched.failed(),
        "relay shutdown complete"
    );

    Ok(())
}

/// Read updates until end of input or cancellation
///
/// Messages from channels that are not a routed source are skipped.
/// Malformed lines are logged and skipped.
pub async fn ingest<R>(
    reader: R,
    registry: &GroupRegistry,
    routes: &RoutingTable,
    cancel: &CancellationToken,
) -> std::io::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IngestStats::default();
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            break;
        };
        stats.lines += 1;

        let event = match parse_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                stats.malformed += 1;
                warn!(line = stats.lines, error = %e, "malformed update, skipping");
                continue;
            }
        };

        if !routes.is_source(event.channel) {
            stats.skipped += 1;
            trace!(channel_id = %event.channel, "channel not routed, skipping");
            continue;
        }

        registry.register(event.channel, event.group, event.message, event.date);
        stats.registered += 1;
    }

    debug!(?stats, "ingest stopped");
    Ok(stats)
}

/// Cancel `cancel` on SIGINT or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, stopping relay...");
        cancel.cancel();
    });
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
