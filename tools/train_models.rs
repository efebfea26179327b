//! Model Trainer
//!
//! Fits the iris and housing pipelines and overwrites their artifacts.

use anyhow::Result;
use prediction_service::{config::AppConfig, logging, training};
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.logging)?;

    info!(
        seed = config.training.seed,
        artifacts_dir = %config.models.artifacts_dir,
        "Starting model training"
    );

    let outcome = training::run(&config)?;
    println!(
        "Iris model {} -> {}",
        outcome.iris.metric,
        outcome.iris.path.display()
    );
    if let Some(housing) = &outcome.housing {
        println!(
            "Housing model {} -> {}",
            housing.metric,
            housing.path.display()
        );
    }

    info!("Training complete");
    Ok(())
}
