//! VeriTrust Server
//!
//! Serves the fine-tuned review classifier over HTTP. A missing or broken model
//! does not stop the server; `/health` reports it and `/predict` answers 503.

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use veritrust_server::telemetry::{init_metrics, init_tracing};
use veritrust_server::{create_router, AppState, Cli, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting VeriTrust API v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load(&cli)?;
    info!("Model: {}", config.model.location());
    info!("CORS origin: {}", config.cors_origin);

    let metrics_handle = init_metrics()?;

    let state = AppState::from_config(&config)?.with_metrics(metrics_handle);
    if !state.model_loaded() {
        warn!("Serving without a model; /predict will answer 503");
    }

    let app = create_router(state, &config.cors_origin)?;

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    warn!("Shutdown signal received, stopping server...");
}
