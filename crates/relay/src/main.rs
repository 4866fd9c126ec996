//! Relay - Album-preserving channel forwarder
//!
//! # Usage
//!
//! ```bash
//! # Forward updates read from stdin (default)
//! relay
//! relay --config configs/relay.toml serve
//!
//! # Validate the destination map
//! FORWARD_MAP="-1001:-2001,-2002" relay check
//!
//! # List channels with known access hashes
//! relay channels
//! ```

mod cmd;
mod event;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_config::{DEFAULT_LOG_LEVEL, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Time given to blocking stdin readers once the command has finished
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Relay - Album-preserving channel forwarder
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (a level or EnvFilter directives). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Forward message updates read from stdin as JSON lines
    Serve,

    /// Validate the destination map and print the parsed routes
    Check,

    /// List channels with known access hashes
    Channels,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(run(cli));

    // stdin reads sit on a blocking thread that cannot be interrupted
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = cmd::load_config(cli.config.as_deref())?;

    init_logging(config.log.filter(cli.log_level.as_deref()), &config.log)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cmd::serve::run(config).await,
        Command::Check => cmd::check::run(&config),
        Command::Channels => cmd::channels::run(&config),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let layer = match (log.format, log.output) {
        (LogFormat::Console, LogOutput::Stdout) => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stdout)
            .boxed(),
        (LogFormat::Console, LogOutput::Stderr) => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Json, LogOutput::Stdout) => fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed(),
        (LogFormat::Json, LogOutput::Stderr) => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    Ok(())
}
