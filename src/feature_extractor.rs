//! Feature extraction from query parameters.
//!
//! Each model was fitted on columns in a fixed order; the schemas here name
//! those columns and build feature vectors in exactly that order.

use crate::error::PredictError;
use std::collections::HashMap;

/// Iris measurement columns, in training order
pub const IRIS_FEATURES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// California housing columns, in training order
pub const HOUSING_FEATURES: [&str; 8] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];

/// Ordered feature names a model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    names: &'static [&'static str],
}

impl FeatureSchema {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub const fn iris() -> Self {
        Self::new(&IRIS_FEATURES)
    }

    pub const fn housing() -> Self {
        Self::new(&HOUSING_FEATURES)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        self.names.len()
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn owned_names(&self) -> Vec<String> {
        self.names.iter().map(|n| n.to_string()).collect()
    }

    /// Extract features without rejecting anything.
    ///
    /// A missing or non-numeric parameter yields `None` in its slot.
    pub fn extract_lenient(&self, params: &HashMap<String, String>) -> Vec<Option<f64>> {
        self.names
            .iter()
            .map(|name| params.get(*name).and_then(|raw| raw.trim().parse::<f64>().ok()))
            .collect()
    }

    /// Extract features, rejecting the first missing parameter in schema order.
    pub fn extract_strict(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Vec<f64>, PredictError> {
        // Presence is checked for every column before any value is parsed.
        for name in self.names {
            if !params.contains_key(*name) {
                return Err(PredictError::MissingParameter(name.to_string()));
            }
        }

        self.names
            .iter()
            .map(|name| {
                let raw = &params[*name];
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| PredictError::InvalidParameter {
                        name: name.to_string(),
                        value: raw.clone(),
                    })
            })
            .collect()
    }

    /// Convert a lenient extraction into a dense vector, failing on the first empty slot.
    pub fn densify(&self, values: &[Option<f64>]) -> Result<Vec<f64>, PredictError> {
        values
            .iter()
            .zip(self.names)
            .map(|(value, name)| value.ok_or_else(|| PredictError::Unconvertible(name.to_string())))
            .collect()
    }
}
