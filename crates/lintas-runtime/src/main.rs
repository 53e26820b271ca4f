//! Lintas node entry point.

use anyhow::{Context, Result};
use tracing::{error, info};

use lintas_runtime::{init_tracing, LintasRuntime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("reading configuration")?;
    init_tracing(&config.logging)?;

    info!(
        addr = %config.gateway.http_addr(),
        snapshot = ?config.storage.snapshot_path,
        "Starting Lintas"
    );

    let runtime = LintasRuntime::new(config)?;
    runtime.run(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for ctrl-c"),
    }
}
