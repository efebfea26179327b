//! Mean imputation for missing feature values

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Replaces NaN values with the column mean observed at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    /// Fit column means, ignoring NaN cells.
    pub fn fit(records: ArrayView2<f64>) -> Self {
        let means = records
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(column, values)| {
                let (sum, count) = values
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                if count == 0 {
                    warn!(column, "No observed values in column, imputing 0.0");
                    0.0
                } else {
                    sum / count as f64
                }
            })
            .collect();

        Self { means }
    }

    pub fn feature_count(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Copy of `row` with NaN cells replaced.
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .map(|(&value, &mean)| if value.is_nan() { mean } else { value })
            .collect()
    }

    /// Copy of `records` with NaN cells replaced.
    pub fn transform(&self, records: ArrayView2<f64>) -> Array2<f64> {
        let mut out = records.to_owned();
        for (mut column, &mean) in out.axis_iter_mut(Axis(1)).zip(&self.means) {
            column.mapv_inplace(|v| if v.is_nan() { mean } else { v });
        }
        out
    }
}
