//! Predictors that turn feature vectors into species labels or house values

use crate::error::PredictError;
use crate::models::forest::RandomForest;
use crate::models::loader::ModelSource;
use crate::types::iris::IrisClass;
use linfa_linear::FittedLinearRegression;
use ndarray::ArrayView1;
use std::sync::Arc;
use tracing::debug;

/// Result of an iris classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrisOutcome {
    pub class: IrisClass,
    /// Fraction of trees that voted for `class`
    pub confidence: f64,
}

/// Iris species classifier backed by a random forest pipeline
pub struct IrisPredictor {
    source: Arc<dyn ModelSource<RandomForest>>,
}

impl IrisPredictor {
    pub fn new(source: Arc<dyn ModelSource<RandomForest>>) -> Self {
        Self { source }
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Classify one feature row (sepal length/width, petal length/width)
    pub fn predict(&self, features: &[f64]) -> Result<IrisOutcome, PredictError> {
        let artifact = self.source.acquire()?;
        let pipeline = &artifact.pipeline;

        let index = pipeline.predict(features)?;
        let class = IrisClass::from_index(index).ok_or(PredictError::UnknownClass(index))?;

        let filled = pipeline.imputer().transform_row(ArrayView1::from(features));
        let confidence = pipeline
            .estimator()
            .predict_proba_row(ArrayView1::from(&filled[..]))
            .get(index)
            .copied()
            .unwrap_or(0.0);

        debug!(
            class = class.label(),
            index,
            confidence,
            "Iris prediction complete"
        );

        Ok(IrisOutcome { class, confidence })
    }
}

/// House value regressor backed by a linear regression pipeline
pub struct HousingPredictor {
    source: Arc<dyn ModelSource<FittedLinearRegression<f64>>>,
}

impl HousingPredictor {
    pub fn new(source: Arc<dyn ModelSource<FittedLinearRegression<f64>>>) -> Self {
        Self { source }
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Predict the median house value for one feature row
    pub fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let artifact = self.source.acquire()?;
        let value = artifact.pipeline.predict(features)?;

        debug!(value, "Housing prediction complete");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureSchema;
    use crate::models::artifact::Artifact;
    use crate::models::forest::RandomForestParams;
    use crate::models::loader::{ModelLoader, OnDisk, Preloaded};
    use crate::models::pipeline::Pipeline;
    use crate::test_support::housing_artifact;
    use ndarray::array;

    fn two_class_iris() -> IrisPredictor {
        let records = array![
            [5.1, 3.5, 1.4, 0.2],
            [4.9, 3.0, 1.4, 0.2],
            [4.7, 3.2, 1.3, 0.2],
            [6.3, 3.3, 6.0, 2.5],
            [5.8, 2.7, 5.1, 1.9],
            [7.1, 3.0, 5.9, 2.1],
        ];
        let targets = array![0usize, 0, 0, 2, 2, 2];
        let pipeline = Pipeline::fit_with(records.view(), |x| {
            RandomForestParams::new(11, 5).fit(x, targets.view())
        })
        .unwrap();
        let artifact = Artifact::new(pipeline, FeatureSchema::iris(), None);
        IrisPredictor::new(Arc::new(Preloaded::new(artifact)))
    }

    #[test]
    fn test_iris_prediction() {
        let predictor = two_class_iris();

        let outcome = predictor.predict(&[5.0, 3.4, 1.4, 0.2]).unwrap();
        assert_eq!(outcome.class, IrisClass::Setosa);
        assert!(outcome.confidence > 0.5 && outcome.confidence <= 1.0);

        let outcome = predictor.predict(&[6.5, 3.0, 5.8, 2.2]).unwrap();
        assert_eq!(outcome.class, IrisClass::Virginia);
    }

    #[test]
    fn test_iris_wrong_width() {
        let predictor = two_class_iris();
        let err = predictor.predict(&[5.0, 3.4]).unwrap_err();
        assert_eq!(err.to_string(), "expected 4 features, got 2");
    }

    #[test]
    fn test_housing_prediction_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.bin");
        let artifact = housing_artifact(0.5);
        artifact.save(&path).unwrap();

        let source: OnDisk<FittedLinearRegression<f64>> =
            ModelLoader::new(FeatureSchema::housing()).on_disk(&path);
        let predictor = HousingPredictor::new(Arc::new(source));

        let row = [3.0, 2.0, 5.0, 1.0, 4.0, 2.0, 7.0, 1.0];
        let value = predictor.predict(&row).unwrap();
        assert_eq!(value, artifact.pipeline.predict(&row).unwrap());
        // 0.4*3 - 0.05*2 + 0.01*4 + 0.5
        assert!((value - 1.64).abs() < 1e-6);
    }

    #[test]
    fn test_housing_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let source: OnDisk<FittedLinearRegression<f64>> =
            ModelLoader::new(FeatureSchema::housing()).on_disk(dir.path().join("absent.bin"));
        let predictor = HousingPredictor::new(Arc::new(source));

        let err = predictor.predict(&[0.0; 8]).unwrap_err();
        assert!(matches!(err, PredictError::Artifact(_)));
    }
}
