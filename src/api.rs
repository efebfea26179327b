//! `/predict` routes (warp-based).
//!
//! The two services disagree on error status: iris reports every fault in the
//! body with 200, housing rejects missing input with 400 and faults with 500.

use crate::config::ModelsConfig;
use crate::error::{ArtifactError, PredictError};
use crate::feature_extractor::FeatureSchema;
use crate::metrics::{RequestOutcome, ServiceMetrics};
use crate::models::forest::RandomForest;
use crate::models::inference::{HousingPredictor, IrisPredictor};
use crate::models::loader::{ModelLoader, ModelSource};
use crate::types::{ErrorBody, HousingPrediction, IrisPrediction};
use linfa_linear::FittedLinearRegression;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

/// Iris classifier plus its request metrics
pub struct IrisService {
    predictor: IrisPredictor,
    metrics: Arc<ServiceMetrics>,
}

impl IrisService {
    pub fn new(predictor: IrisPredictor, metrics: Arc<ServiceMetrics>) -> Self {
        Self { predictor, metrics }
    }

    /// Load the iris artifact once; the service fails to start without it.
    pub fn from_config(
        models: &ModelsConfig,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<Self, ArtifactError> {
        let loader = ModelLoader::new(FeatureSchema::iris());
        let source: Arc<dyn ModelSource<RandomForest>> =
            Arc::new(loader.preload::<RandomForest, _>(models.iris_path())?);
        let predictor = IrisPredictor::new(source);
        info!(source = %predictor.describe_source(), "Iris service ready");
        Ok(Self::new(predictor, metrics))
    }
}

/// Housing regressor plus its request metrics
pub struct HousingService {
    predictor: HousingPredictor,
    metrics: Arc<ServiceMetrics>,
}

impl HousingService {
    pub fn new(predictor: HousingPredictor, metrics: Arc<ServiceMetrics>) -> Self {
        Self { predictor, metrics }
    }

    /// Either re-read the artifact per request or load it once, per configuration.
    pub fn from_config(
        models: &ModelsConfig,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<Self, ArtifactError> {
        let loader = ModelLoader::new(FeatureSchema::housing());
        let path = models.housing_path();

        let source: Arc<dyn ModelSource<FittedLinearRegression<f64>>> =
            if models.housing_reload_on_request {
                if !path.exists() {
                    warn!(
                        path = %path.display(),
                        "Housing artifact not found yet, requests will fail until it exists"
                    );
                }
                Arc::new(loader.on_disk::<FittedLinearRegression<f64>, _>(&path))
            } else {
                Arc::new(loader.preload::<FittedLinearRegression<f64>, _>(&path)?)
            };

        let predictor = HousingPredictor::new(source);
        info!(source = %predictor.describe_source(), "Housing service ready");
        Ok(Self::new(predictor, metrics))
    }
}

/// `GET /predict` for the iris classifier
pub fn iris_routes(service: Arc<IrisService>) -> BoxedFilter<(Response,)> {
    predict_path()
        .and(warp::query::<HashMap<String, String>>())
        .and(with_service(service))
        .and_then(handle_iris_predict)
        .boxed()
}

/// `GET /predict` for the housing regressor
pub fn housing_routes(service: Arc<HousingService>) -> BoxedFilter<(Response,)> {
    predict_path()
        .and(warp::query::<HashMap<String, String>>())
        .and(with_service(service))
        .and_then(handle_housing_predict)
        .boxed()
}

fn predict_path() -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::path("predict").and(warp::path::end()).and(warp::get())
}

fn with_service<S: Send + Sync + 'static>(
    service: Arc<S>,
) -> impl Filter<Extract = (Arc<S>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_iris_predict(
    params: HashMap<String, String>,
    service: Arc<IrisService>,
) -> Result<Response, Infallible> {
    let start = Instant::now();
    let schema = FeatureSchema::iris();

    let result = schema
        .densify(&schema.extract_lenient(&params))
        .and_then(|features| service.predictor.predict(&features));

    let response = match result {
        Ok(outcome) => {
            service.metrics.record_request(start.elapsed(), RequestOutcome::Success);
            service.metrics.record_label(outcome.class.label());
            debug!(
                label = outcome.class.label(),
                confidence = outcome.confidence,
                latency_us = start.elapsed().as_micros() as u64,
                "Iris request served"
            );
            json_response(&IrisPrediction::new(outcome.class), StatusCode::OK)
        }
        Err(err) => {
            service.metrics.record_request(start.elapsed(), RequestOutcome::Failed);
            warn!(error = %err, "Iris prediction failed");
            // Reported in the body only; the status stays 200.
            json_response(&ErrorBody::new(err.to_string()), StatusCode::OK)
        }
    };

    Ok(response)
}

async fn handle_housing_predict(
    params: HashMap<String, String>,
    service: Arc<HousingService>,
) -> Result<Response, Infallible> {
    let start = Instant::now();

    let result = FeatureSchema::housing()
        .extract_strict(&params)
        .and_then(|features| service.predictor.predict(&features));

    let response = match result {
        Ok(value) => {
            service.metrics.record_request(start.elapsed(), RequestOutcome::Success);
            service.metrics.record_value(value);
            debug!(
                value,
                latency_us = start.elapsed().as_micros() as u64,
                "Housing request served"
            );
            json_response(&HousingPrediction { prediction1: value }, StatusCode::OK)
        }
        Err(err) => {
            let status = housing_status(&err);
            if status == StatusCode::BAD_REQUEST {
                service.metrics.record_request(start.elapsed(), RequestOutcome::Rejected);
                debug!(error = %err, "Housing request rejected");
            } else {
                service.metrics.record_request(start.elapsed(), RequestOutcome::Failed);
                warn!(error = %err, "Housing prediction failed");
            }
            json_response(&ErrorBody::new(err.to_string()), status)
        }
    };

    Ok(response)
}

// =============================================================================
// Helpers
// =============================================================================

fn json_response<T: serde::Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

/// Missing input is the caller's fault; anything else is reported as a server fault.
fn housing_status(err: &PredictError) -> StatusCode {
    if err.is_bad_request() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
