//! Imputer + estimator bundles used as a single inference unit

use crate::error::PredictError;
use crate::models::forest::RandomForest;
use crate::models::imputer::MeanImputer;
use linfa::traits::Predict;
use linfa_linear::FittedLinearRegression;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// A fitted model that predicts from one dense feature row
pub trait Estimator {
    type Output;

    fn predict_row(&self, features: ArrayView1<f64>) -> Self::Output;
}

impl Estimator for RandomForest {
    type Output = usize;

    fn predict_row(&self, features: ArrayView1<f64>) -> usize {
        RandomForest::predict_row(self, features)
    }
}

impl Estimator for FittedLinearRegression<f64> {
    type Output = f64;

    fn predict_row(&self, features: ArrayView1<f64>) -> f64 {
        let x = features.insert_axis(Axis(0));
        let predicted: Array1<f64> = self.predict(&x);
        predicted[0]
    }
}

/// Missing-value imputation followed by an estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline<M> {
    imputer: MeanImputer,
    estimator: M,
}

pub type IrisPipeline = Pipeline<RandomForest>;
pub type HousingPipeline = Pipeline<FittedLinearRegression<f64>>;

impl<M> Pipeline<M> {
    pub fn new(imputer: MeanImputer, estimator: M) -> Self {
        Self { imputer, estimator }
    }

    /// Fit the imputer on `records` and the estimator on the imputed records.
    pub fn fit_with<F, E>(records: ArrayView2<f64>, fit_estimator: F) -> Result<Self, E>
    where
        F: FnOnce(ArrayView2<f64>) -> Result<M, E>,
    {
        let imputer = MeanImputer::fit(records);
        let imputed = imputer.transform(records);
        let estimator = fit_estimator(imputed.view())?;
        Ok(Self { imputer, estimator })
    }

    pub fn feature_count(&self) -> usize {
        self.imputer.feature_count()
    }

    pub fn imputer(&self) -> &MeanImputer {
        &self.imputer
    }

    pub fn estimator(&self) -> &M {
        &self.estimator
    }
}

impl<M: Estimator> Pipeline<M> {
    /// Impute NaN cells and predict. The row must match the fitted width.
    pub fn predict(&self, features: &[f64]) -> Result<M::Output, PredictError> {
        if features.len() != self.feature_count() {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.feature_count(),
                actual: features.len(),
            });
        }

        let filled = self.imputer.transform_row(ArrayView1::from(features));
        Ok(self.estimator.predict_row(ArrayView1::from(&filled[..])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::RandomForestParams;
    use linfa::prelude::*;
    use linfa::Dataset;
    use linfa_linear::LinearRegression;
    use ndarray::array;

    #[test]
    fn test_linear_pipeline_imputes_before_predicting() {
        // y = 2a + b
        let records = array![[1.0, 1.0], [2.0, 0.0], [3.0, 2.0], [4.0, 1.0], [0.0, 3.0]];
        let targets = array![3.0, 4.0, 8.0, 9.0, 3.0];

        let pipeline: HousingPipeline = Pipeline::fit_with(records.view(), |x| {
            LinearRegression::new().fit(&Dataset::new(x.to_owned(), targets.clone()))
        })
        .unwrap();

        let exact = pipeline.predict(&[5.0, 2.0]).unwrap();
        assert!((exact - 12.0).abs() < 1e-6);

        // Second column mean is 1.4
        let imputed = pipeline.predict(&[1.0, f64::NAN]).unwrap();
        assert!((imputed - 3.4).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let records = array![[0.0, 0.0], [1.0, 1.0], [0.1, 0.2], [0.9, 1.1]];
        let targets = array![0usize, 1, 0, 1];

        let pipeline: IrisPipeline = Pipeline::fit_with(records.view(), |x| {
            RandomForestParams::new(5, 1).fit(x, targets.view())
        })
        .unwrap();

        let err = pipeline.predict(&[0.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::FeatureCountMismatch { expected: 2, actual: 1 }
        ));
    }
}
