//! Prediction Service - Main Entry Point
//!
//! Loads the configured model artifact and serves `GET /predict` until Ctrl-C.

use anyhow::{Context, Result};
use prediction_service::{
    api::{self, HousingService, IrisService},
    config::{AppConfig, ServiceVariant},
    logging,
    metrics::{MetricsReporter, ServiceMetrics},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    logging::init(&config.logging)?;

    info!("Starting prediction service");
    info!(
        variant = ?config.service.variant,
        artifacts_dir = %config.models.artifacts_dir,
        "Configuration loaded successfully"
    );

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Load the model before accepting requests
    let routes = match config.service.variant {
        ServiceVariant::Iris => {
            let service = IrisService::from_config(&config.models, metrics.clone())
                .context("Failed to load iris model")?;
            api::iris_routes(Arc::new(service))
        }
        ServiceVariant::Housing => {
            let service = HousingService::from_config(&config.models, metrics.clone())
                .context("Failed to load housing model")?;
            api::housing_routes(Arc::new(service))
        }
    };

    if config.server.metrics_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.server.metrics_interval_secs);
        tokio::spawn(reporter.start());
    }

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(address = %bound, "Listening on GET /predict");
    server.await;

    // Print final summary
    info!("Prediction service shutting down...");
    metrics.print_summary();

    Ok(())
}
