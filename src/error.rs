//! Error types for prediction requests and model artifacts

use crate::models::artifact::ModelKind;
use std::path::PathBuf;

/// Faults raised while turning a request into a prediction.
///
/// The `Display` strings are what clients see in the `error` field.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Query parameter {0} is missing")]
    MissingParameter(String),

    #[error("Query parameter {name} is not a number: {value:?}")]
    InvalidParameter { name: String, value: String },

    #[error("could not convert {0} to float: no value provided")]
    Unconvertible(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("unknown class index {0}")]
    UnknownClass(usize),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl PredictError {
    /// Whether the fault is the caller's (missing input) rather than the service's
    pub fn is_bad_request(&self) -> bool {
        matches!(self, PredictError::MissingParameter(_))
    }
}

/// Faults raised while reading or writing a model artifact
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to access artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode or decode artifact {path}: {source}")]
    Codec {
        path: PathBuf,
        source: bincode::Error,
    },

    #[error("artifact {path} holds a {found:?} model, expected {expected:?}")]
    KindMismatch {
        path: PathBuf,
        expected: ModelKind,
        found: ModelKind,
    },

    #[error("artifact {path} was fitted on features {found:?}, expected {expected:?}")]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
}
