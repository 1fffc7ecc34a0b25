// src/main.rs - exporter entry point
use clap::Parser;
use std::sync::Arc;
use tokio::sync::RwLock;

use octoprom::config::{self, Config};
use octoprom::events::ProgressSnapshot;
use octoprom::lifecycle::LifecycleController;
use octoprom::metrics::PrinterMetrics;
use octoprom::web::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "octoprom", about = "Prometheus telemetry exporter for printer hosts")]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting octoprom exporter");

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            config::load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path, e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?
        }
        None => Config::default(),
    };

    if !config.exporter.exposed {
        tracing::warn!("Prometheus metrics are not exposed; /metrics will answer 404");
    }

    let metrics = Arc::new(PrinterMetrics::new()?);
    let controller = LifecycleController::new(metrics.clone());
    let state = AppState {
        controller,
        metrics,
        status: Arc::new(RwLock::new(ProgressSnapshot::default())),
        exposed: config.exporter.exposed,
    };

    let app = web::create_router(state);
    let addr = format!("{}:{}", config.exporter.bind, config.exporter.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Metrics endpoint listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
