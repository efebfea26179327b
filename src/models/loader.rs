//! Model artifact loading and the sources the predictors read from

use crate::error::ArtifactError;
use crate::feature_extractor::FeatureSchema;
use crate::models::artifact::{Artifact, ArtifactModel};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loader for model artifacts
pub struct ModelLoader {
    schema: FeatureSchema,
}

impl ModelLoader {
    /// Create a loader that validates artifacts against `schema`
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    /// Load a single artifact from file
    pub fn load<M: ArtifactModel, P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Artifact<M>, ArtifactError> {
        let path = path.as_ref();
        debug!(path = %path.display(), kind = ?M::KIND, "Loading model artifact");

        let artifact = Artifact::<M>::load(path, self.schema)?;

        info!(
            path = %path.display(),
            artifact_id = %artifact.metadata.artifact_id,
            kind = ?artifact.metadata.kind,
            trained_at = %artifact.metadata.trained_at,
            metric = ?artifact.metadata.metric,
            "Model artifact loaded"
        );

        Ok(artifact)
    }

    /// Load an artifact once and keep it in memory
    pub fn preload<M: ArtifactModel, P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Preloaded<M>, ArtifactError> {
        self.load(path).map(Preloaded::new)
    }

    /// Source that re-reads the artifact on every acquisition
    pub fn on_disk<M: ArtifactModel, P: AsRef<Path>>(&self, path: P) -> OnDisk<M> {
        OnDisk::new(path.as_ref().to_path_buf(), self.schema)
    }
}

/// Where a predictor gets its model from.
pub trait ModelSource<M>: Send + Sync {
    fn acquire(&self) -> Result<Arc<Artifact<M>>, ArtifactError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Artifact loaded at start-up and shared read-only
pub struct Preloaded<M> {
    artifact: Arc<Artifact<M>>,
}

impl<M> Preloaded<M> {
    pub fn new(artifact: Artifact<M>) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }
}

impl<M: Send + Sync> ModelSource<M> for Preloaded<M> {
    fn acquire(&self) -> Result<Arc<Artifact<M>>, ArtifactError> {
        Ok(Arc::clone(&self.artifact))
    }

    fn describe(&self) -> String {
        format!("preloaded artifact {}", self.artifact.metadata.artifact_id)
    }
}

/// Artifact read from disk for every request
pub struct OnDisk<M> {
    path: PathBuf,
    schema: FeatureSchema,
    _model: PhantomData<fn() -> M>,
}

impl<M> OnDisk<M> {
    pub fn new(path: PathBuf, schema: FeatureSchema) -> Self {
        Self {
            path,
            schema,
            _model: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<M: ArtifactModel + Send + Sync> ModelSource<M> for OnDisk<M> {
    fn acquire(&self) -> Result<Arc<Artifact<M>>, ArtifactError> {
        debug!(path = %self.path.display(), "Reloading model artifact");
        Artifact::load(&self.path, self.schema).map(Arc::new)
    }

    fn describe(&self) -> String {
        format!("artifact reloaded per request from {}", self.path.display())
    }
}
