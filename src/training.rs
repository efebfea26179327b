//! Model training for the iris classifier and the housing regressor.
//!
//! Each run shuffles with the configured seed, holds out a test partition,
//! fits an imputer + estimator pipeline, scores it and overwrites the artifact.
//! The score is reported only; it never blocks the save.

use crate::config::{AppConfig, TrainingConfig};
use crate::datasets;
use crate::feature_extractor::FeatureSchema;
use crate::models::artifact::{Artifact, ArtifactModel, EvaluationMetric};
use crate::models::forest::RandomForestParams;
use crate::models::pipeline::{HousingPipeline, IrisPipeline, Pipeline};
use anyhow::{Context, Result};
use linfa::prelude::*;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Ix1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact_id: Uuid,
    pub path: PathBuf,
    pub metric: EvaluationMetric,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Reports from one trainer run
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub iris: TrainingReport,
    /// `None` when no housing CSV is configured
    pub housing: Option<TrainingReport>,
}

/// Train every model the configuration describes, writing the artifacts
/// under `models.artifacts_dir`.
pub fn run(config: &AppConfig) -> Result<TrainingRun> {
    let iris = train_iris(&config.training, config.models.iris_path())?;

    let housing = match &config.training.housing_csv {
        Some(csv) => Some(train_housing(
            &config.training,
            csv,
            config.models.housing_path(),
        )?),
        None => {
            warn!("No housing_csv configured, skipping housing model");
            None
        }
    };

    Ok(TrainingRun { iris, housing })
}

/// Fit the iris pipeline on the embedded dataset and save it to `output`
pub fn train_iris<P: AsRef<Path>>(config: &TrainingConfig, output: P) -> Result<TrainingReport> {
    train_iris_on(datasets::iris(), config, output.as_ref())
}

fn train_iris_on(
    dataset: Dataset<f64, usize, Ix1>,
    config: &TrainingConfig,
    output: &Path,
) -> Result<TrainingReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, test) = dataset
        .shuffle(&mut rng)
        .split_with_ratio(1.0 - config.iris_test_ratio);

    info!(
        train = train.records().nrows(),
        test = test.records().nrows(),
        n_trees = config.n_trees,
        seed = config.seed,
        "Training iris random forest"
    );

    let params = RandomForestParams::new(config.n_trees, config.seed).max_depth(config.max_depth);
    let pipeline: IrisPipeline = Pipeline::fit_with(train.records().view(), |x| {
        params.fit(x, train.targets().view())
    })
    .context("Failed to fit iris pipeline")?;

    let imputed = pipeline.imputer().transform(test.records().view());
    let predicted = pipeline.estimator().predict_batch(imputed.view());
    let accuracy = predicted
        .confusion_matrix(&test)
        .context("Failed to score iris pipeline")?
        .accuracy() as f64;

    let metric = EvaluationMetric::Accuracy(accuracy);
    info!(accuracy, "Iris model evaluated");

    let samples = (train.records().nrows(), test.records().nrows());
    save(pipeline, FeatureSchema::iris(), metric, output, samples)
}

/// Fit the housing pipeline on the CSV export at `csv` and save it to `output`
pub fn train_housing<P: AsRef<Path>, Q: AsRef<Path>>(
    config: &TrainingConfig,
    csv: P,
    output: Q,
) -> Result<TrainingReport> {
    let dataset = datasets::load_housing_csv(csv)?;
    train_housing_on(dataset, config, output.as_ref())
}

fn train_housing_on(
    dataset: Dataset<f64, f64, Ix1>,
    config: &TrainingConfig,
    output: &Path,
) -> Result<TrainingReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, test) = dataset
        .shuffle(&mut rng)
        .split_with_ratio(1.0 - config.housing_test_ratio);

    info!(
        train = train.records().nrows(),
        test = test.records().nrows(),
        seed = config.seed,
        "Training housing linear regression"
    );

    let pipeline: HousingPipeline = Pipeline::fit_with(train.records().view(), |x| {
        LinearRegression::new().fit(&Dataset::new(x.to_owned(), train.targets().clone()))
    })
    .context("Failed to fit housing pipeline")?;

    let imputed = pipeline.imputer().transform(test.records().view());
    let predicted: Array1<f64> = pipeline.estimator().predict(&imputed);
    let mse = predicted
        .mean_squared_error(&test)
        .context("Failed to score housing pipeline")?;

    let metric = EvaluationMetric::MeanSquaredError(mse);
    info!(mse, "Housing model evaluated");

    let samples = (train.records().nrows(), test.records().nrows());
    save(pipeline, FeatureSchema::housing(), metric, output, samples)
}

fn save<M: ArtifactModel>(
    pipeline: Pipeline<M>,
    schema: FeatureSchema,
    metric: EvaluationMetric,
    output: &Path,
    (train_samples, test_samples): (usize, usize),
) -> Result<TrainingReport> {
    let artifact = Artifact::new(pipeline, schema, Some(metric));
    artifact
        .save(output)
        .with_context(|| format!("Failed to save artifact to {}", output.display()))?;

    info!(
        path = %output.display(),
        artifact_id = %artifact.metadata.artifact_id,
        kind = ?artifact.metadata.kind,
        "Artifact written"
    );

    Ok(TrainingReport {
        artifact_id: artifact.metadata.artifact_id,
        path: output.to_path_buf(),
        metric,
        train_samples,
        test_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::artifact::ModelKind;
    use crate::models::forest::RandomForest;
    use crate::test_support::{housing_csv, synthetic_housing};
    use linfa_linear::FittedLinearRegression;
    use std::fs;

    fn quick_config() -> TrainingConfig {
        let mut config = AppConfig::default().training;
        config.n_trees = 15;
        config
    }

    #[test]
    fn test_iris_training_predicts_first_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.bin");

        let report = train_iris(&quick_config(), &path).unwrap();
        assert_eq!(report.train_samples + report.test_samples, 150);
        match report.metric {
            EvaluationMetric::Accuracy(a) => assert!(a > 0.85, "accuracy {}", a),
            other => panic!("unexpected metric {:?}", other),
        }

        let artifact: Artifact<RandomForest> =
            Artifact::load(&path, FeatureSchema::iris()).unwrap();
        assert_eq!(artifact.metadata.kind, ModelKind::RandomForestClassifier);
        assert_eq!(artifact.pipeline.predict(&[5.1, 3.5, 1.4, 0.2]).unwrap(), 0);
    }

    #[test]
    fn test_retraining_overwrites_with_same_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.bin");
        let config = quick_config();

        let first = train_iris(&config, &path).unwrap();
        let before: Artifact<RandomForest> = Artifact::load(&path, FeatureSchema::iris()).unwrap();
        let dataset = datasets::iris();

        for _ in 0..3 {
            let again = train_iris(&config, &path).unwrap();
            let after: Artifact<RandomForest> =
                Artifact::load(&path, FeatureSchema::iris()).unwrap();

            assert_ne!(first.artifact_id, again.artifact_id);
            assert_eq!(after.metadata.artifact_id, again.artifact_id);
            assert_eq!(again.metric, first.metric);

            for row in dataset.records().rows() {
                let row = row.to_vec();
                assert_eq!(
                    before.pipeline.predict(&row).unwrap(),
                    after.pipeline.predict(&row).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_run_with_default_config_skips_housing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.models.artifacts_dir = dir.path().to_string_lossy().into_owned();

        let outcome = run(&config).unwrap();

        assert!(outcome.housing.is_none());
        assert_eq!(outcome.iris.path, config.models.iris_path());
        assert!(config.models.iris_path().exists());
        assert!(!config.models.housing_path().exists());
    }

    #[test]
    fn test_run_trains_housing_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("housing.csv");
        let (records, targets) = synthetic_housing(60, 0.5, 11);
        fs::write(&csv, housing_csv(&records, &targets)).unwrap();

        let mut config = AppConfig::default();
        config.models.artifacts_dir = dir.path().to_string_lossy().into_owned();
        config.training.n_trees = 10;
        config.training.housing_csv = Some(csv.to_string_lossy().into_owned());

        let outcome = run(&config).unwrap();

        let housing = outcome.housing.unwrap();
        assert_eq!(housing.path, config.models.housing_path());
        assert!(config.models.housing_path().exists());
    }

    #[test]
    fn test_housing_training_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("housing.csv");
        let (records, targets) = synthetic_housing(80, 1.0, 3);
        fs::write(&csv, housing_csv(&records, &targets)).unwrap();

        let path = dir.path().join("housing.bin");
        let report = train_housing(&quick_config(), &csv, &path).unwrap();
        assert_eq!(report.train_samples + report.test_samples, 80);
        match report.metric {
            EvaluationMetric::MeanSquaredError(mse) => assert!(mse < 1e-6, "mse {}", mse),
            other => panic!("unexpected metric {:?}", other),
        }

        let artifact: Artifact<FittedLinearRegression<f64>> =
            Artifact::load(&path, FeatureSchema::housing()).unwrap();
        let value = artifact
            .pipeline
            .predict(&[8.3252, 41.0, 6.984127, 1.02381, 322.0, 2.555556, 37.88, -122.23])
            .unwrap();
        // 0.4*8.3252 - 0.05*41 + 0.01*322 + 1.0
        assert!((value - 5.50008).abs() < 1e-4);
    }

    #[test]
    fn test_housing_missing_csv_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let result = train_housing(
            &quick_config(),
            dir.path().join("absent.csv"),
            dir.path().join("housing.bin"),
        );
        assert!(result.is_err());
        assert!(!dir.path().join("housing.bin").exists());
    }
}
