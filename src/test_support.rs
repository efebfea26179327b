//! Fixtures shared by unit tests

use crate::feature_extractor::{FeatureSchema, HOUSING_FEATURES};
use crate::models::artifact::Artifact;
use crate::models::pipeline::{HousingPipeline, Pipeline};
use linfa::prelude::*;
use linfa::Dataset;
use linfa_linear::{FittedLinearRegression, LinearRegression};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random housing-shaped records with a linear target plus `offset`
pub fn synthetic_housing(n_samples: usize, offset: f64, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = Array2::from_shape_fn((n_samples, HOUSING_FEATURES.len()), |_| {
        rng.gen_range(0.0..10.0)
    });
    let targets = records
        .rows()
        .into_iter()
        .map(|row| 0.4 * row[0] - 0.05 * row[1] + 0.01 * row[4] + offset)
        .collect();
    (records, targets)
}

pub fn housing_artifact(offset: f64) -> Artifact<FittedLinearRegression<f64>> {
    let (records, targets) = synthetic_housing(60, offset, 11);
    let pipeline: HousingPipeline = Pipeline::fit_with(records.view(), |x| {
        LinearRegression::new().fit(&Dataset::new(x.to_owned(), targets.clone()))
    })
    .unwrap();
    Artifact::new(pipeline, FeatureSchema::housing(), None)
}

/// CSV export with the given rows, header included
pub fn housing_csv(records: &Array2<f64>, targets: &Array1<f64>) -> String {
    let mut out = HOUSING_FEATURES.join(",");
    out.push_str(",MedHouseVal\n");
    for (row, target) in records.rows().into_iter().zip(targets.iter()) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&cells.join(","));
        out.push_str(&format!(",{}\n", target));
    }
    out
}
