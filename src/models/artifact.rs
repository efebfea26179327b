//! Serialized model artifacts.
//!
//! An artifact is a fitted [`Pipeline`] plus the metadata needed to check it
//! against the serving schema. The encoding is `bincode` and is only meant to
//! be read back by this crate.

use crate::error::ArtifactError;
use crate::feature_extractor::FeatureSchema;
use crate::models::forest::RandomForest;
use crate::models::pipeline::{Estimator, Pipeline};
use chrono::{DateTime, Utc};
use linfa_linear::FittedLinearRegression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// What kind of estimator an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    RandomForestClassifier,
    LinearRegression,
}

/// Held-out score recorded at training time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvaluationMetric {
    Accuracy(f64),
    MeanSquaredError(f64),
}

impl std::fmt::Display for EvaluationMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationMetric::Accuracy(v) => write!(f, "accuracy={:.4}", v),
            EvaluationMetric::MeanSquaredError(v) => write!(f, "mse={:.4}", v),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub artifact_id: Uuid,
    pub kind: ModelKind,
    /// Column names, in the order the pipeline expects them
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub metric: Option<EvaluationMetric>,
}

/// Estimators that can be stored in an artifact
pub trait ArtifactModel: Estimator + Serialize + DeserializeOwned {
    const KIND: ModelKind;
}

impl ArtifactModel for RandomForest {
    const KIND: ModelKind = ModelKind::RandomForestClassifier;
}

impl ArtifactModel for FittedLinearRegression<f64> {
    const KIND: ModelKind = ModelKind::LinearRegression;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact<M> {
    pub metadata: ArtifactMetadata,
    pub pipeline: Pipeline<M>,
}

impl<M: ArtifactModel> Artifact<M> {
    /// Wrap a freshly fitted pipeline
    pub fn new(
        pipeline: Pipeline<M>,
        schema: FeatureSchema,
        metric: Option<EvaluationMetric>,
    ) -> Self {
        Self {
            metadata: ArtifactMetadata {
                artifact_id: Uuid::new_v4(),
                kind: M::KIND,
                feature_names: schema.owned_names(),
                trained_at: Utc::now(),
                metric,
            },
            pipeline,
        }
    }

    /// Write the artifact, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        bincode::serialize_into(&mut writer, self).map_err(|source| ArtifactError::Codec {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)
    }

    /// Read an artifact and check it against the serving schema.
    pub fn load<P: AsRef<Path>>(path: P, schema: FeatureSchema) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = BufReader::new(file);
        let codec_err = |source| ArtifactError::Codec {
            path: path.to_path_buf(),
            source,
        };

        // Metadata is decoded first so a different estimator is reported as such.
        let metadata: ArtifactMetadata = bincode::deserialize_from(&mut reader).map_err(codec_err)?;
        if metadata.kind != M::KIND {
            return Err(ArtifactError::KindMismatch {
                path: path.to_path_buf(),
                expected: M::KIND,
                found: metadata.kind,
            });
        }

        let pipeline: Pipeline<M> = bincode::deserialize_from(&mut reader).map_err(codec_err)?;
        let artifact = Self { metadata, pipeline };

        let expected = schema.owned_names();
        if artifact.metadata.feature_names != expected
            || artifact.pipeline.feature_count() != expected.len()
        {
            return Err(ArtifactError::SchemaMismatch {
                path: path.to_path_buf(),
                expected,
                found: artifact.metadata.feature_names,
            });
        }

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::RandomForestParams;
    use crate::models::pipeline::IrisPipeline;
    use ndarray::array;

    fn small_iris_like() -> IrisPipeline {
        let records = array![
            [5.1, 3.5, 1.4, 0.2],
            [4.9, 3.0, 1.4, 0.2],
            [7.0, 3.2, 4.7, 1.4],
            [6.4, 3.2, 4.5, 1.5],
            [6.3, 3.3, 6.0, 2.5],
            [5.8, 2.7, 5.1, 1.9],
        ];
        let targets = array![0usize, 0, 1, 1, 2, 2];
        Pipeline::fit_with(records.view(), |x| {
            RandomForestParams::new(9, 42).fit(x, targets.view())
        })
        .unwrap()
    }

    #[test]
    fn test_save_and_load_predict_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("iris.bin");

        let artifact = Artifact::new(
            small_iris_like(),
            FeatureSchema::iris(),
            Some(EvaluationMetric::Accuracy(1.0)),
        );
        artifact.save(&path).unwrap();

        let loaded: Artifact<RandomForest> = Artifact::load(&path, FeatureSchema::iris()).unwrap();
        assert_eq!(loaded.metadata.artifact_id, artifact.metadata.artifact_id);
        assert_eq!(loaded.metadata.kind, ModelKind::RandomForestClassifier);
        assert_eq!(loaded.metadata.metric, Some(EvaluationMetric::Accuracy(1.0)));

        for row in [[5.0, 3.4, 1.5, 0.2], [6.0, 2.9, 4.5, 1.5], [6.9, 3.1, 5.4, 2.1]] {
            assert_eq!(
                loaded.pipeline.predict(&row).unwrap(),
                artifact.pipeline.predict(&row).unwrap()
            );
        }
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.bin");
        Artifact::new(small_iris_like(), FeatureSchema::iris(), None)
            .save(&path)
            .unwrap();

        const REORDERED: [&str; 4] = ["sepal_width", "sepal_length", "petal_length", "petal_width"];
        let err =
            Artifact::<RandomForest>::load(&path, FeatureSchema::new(&REORDERED)).unwrap_err();
        assert!(matches!(err, ArtifactError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.bin");
        Artifact::new(small_iris_like(), FeatureSchema::iris(), None)
            .save(&path)
            .unwrap();

        let err = Artifact::<FittedLinearRegression<f64>>::load(&path, FeatureSchema::iris())
            .unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::KindMismatch {
                expected: ModelKind::LinearRegression,
                found: ModelKind::RandomForestClassifier,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            Artifact::<RandomForest>::load(dir.path().join("absent.bin"), FeatureSchema::iris())
                .unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(EvaluationMetric::Accuracy(0.9).to_string(), "accuracy=0.9000");
        assert_eq!(EvaluationMetric::MeanSquaredError(0.5).to_string(), "mse=0.5000");
    }
}
