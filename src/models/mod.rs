//! Model pipeline, artifact and inference components

pub mod aggregator;
pub mod artifact;
pub mod forest;
pub mod imputer;
pub mod inference;
pub mod loader;
pub mod pipeline;
pub mod tree;

pub use aggregator::VoteAggregator;
pub use artifact::{Artifact, EvaluationMetric, ModelKind};
pub use forest::{RandomForest, RandomForestParams};
pub use imputer::MeanImputer;
pub use inference::{HousingPredictor, IrisOutcome, IrisPredictor};
pub use loader::{ModelLoader, ModelSource, OnDisk, Preloaded};
pub use pipeline::{HousingPipeline, IrisPipeline, Pipeline};
pub use tree::{ClassificationTree, TreeParams};
