//! Prediction Service Library
//!
//! Trains an iris species classifier and a California housing regressor,
//! stores them as artifacts, and serves them over HTTP on `GET /predict`.

pub mod api;
pub mod config;
pub mod datasets;
pub mod error;
pub mod feature_extractor;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod training;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::{HousingService, IrisService};
pub use config::{AppConfig, ServiceVariant};
pub use error::{ArtifactError, PredictError};
pub use feature_extractor::FeatureSchema;
pub use models::inference::{HousingPredictor, IrisPredictor};
pub use types::{HousingPrediction, IrisClass, IrisPrediction};
