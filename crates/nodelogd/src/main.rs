//! nodelog daemon - periodic rotation of per-node log directories

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod daemon;

use cli::Cli;
use daemon::Daemon;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("nodelogd={0},nodelog_rotator={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let daemon = match Daemon::new(cli.config.as_deref()) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.once {
        let reports = daemon.run_once().await;
        let failed: usize = reports.iter().map(|r| r.failed).sum();
        if failed > 0 {
            anyhow::bail!("{} subdirectories failed to rotate", failed);
        }
        return Ok(());
    }

    info!("nodelogd starting...");

    // Set up signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        _ = daemon.run() => {}
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    info!("nodelogd shutdown complete");
    Ok(())
}
