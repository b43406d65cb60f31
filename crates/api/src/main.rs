//! Firewatch Dashboard Server - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Firewatch Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting alert intake and broadcast server...");

    let settings = Settings::load()?;
    run_server(settings).await?;

    Ok(())
}
