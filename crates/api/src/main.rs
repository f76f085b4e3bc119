//! Car Price API - Main Entry Point

use anyhow::Context;
use api::{init_logging, install_metrics_recorder, run_server, AppState, Settings};
use artifact_store::Artifacts;
use data_validator::Validator;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_logging(&settings.logging);

    info!("=== Car Price API v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = if settings.server.metrics {
        Some(install_metrics_recorder().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let artifacts = Artifacts::load(&settings.artifacts, &settings.layout)
        .context("failed to load training artifacts")?;
    let validator = Validator::new(settings.validation.clone());

    run_server(
        &settings.server.bind_addr,
        AppState::new(artifacts, validator, metrics),
    )
    .await?;

    Ok(())
}
