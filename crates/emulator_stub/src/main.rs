//! Stub emulator control service binary
//!
//! Listens for control commands and logs the device state they produce.

use anyhow::{Context, Result};
use clap::Parser;
use emulator_stub::{RecordingHandler, StubServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stub emulator control service
#[derive(Parser, Debug)]
#[command(name = "emulator-stub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stand-in for an emulator's device control service", long_about = None)]
struct Args {
    /// Bind address for the QUIC control service
    #[arg(short, long, default_value = "127.0.0.1:8554")]
    bind: String,

    /// Require this auth token on every request
    #[arg(short, long)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    info!("Starting emulator-stub v{}", env!("CARGO_PKG_VERSION"));

    let bind_addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", args.bind))?;

    if args.token.is_some() {
        info!("Requests must carry the configured auth token");
    }

    let handler = Arc::new(RecordingHandler::new());
    let server = StubServer::bind(bind_addr, handler.clone(), args.token).await?;

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        })
        .await?;

    let state = handler.state().await;
    info!(
        "Final state: mode={:?} orientation={:?} applied={} rejected={}",
        state.device_mode, state.orientation, state.applied, state.rejected
    );
    Ok(())
}

/// Setup logging with tracing
fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
