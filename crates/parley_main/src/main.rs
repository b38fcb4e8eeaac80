mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parley_config::Settings;
use parley_infra::ParleyInfra;
use parley_server::Dispatcher;
use parley_services::ParleyServices;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_dir.as_deref());

    let settings = cli.apply(
        Settings::load(&cli.config)
            .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?,
    );
    tracing::info!(
        ollama = %settings.ollama_url,
        model = %settings.default_model,
        "Starting parley"
    );

    let infra = Arc::new(ParleyInfra::new(&settings)?);
    let services = ParleyServices::new(infra, &settings);
    let app = parley_server::router(Dispatcher::new(services));

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    let url = format!("http://localhost:{}", settings.port);
    tracing::info!(%address, %url, "Listening");

    if cli.open {
        if let Err(err) = open::that(&url) {
            tracing::warn!(error = %err, "Could not open the browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("parley shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
