//! Iris species classes and the classifier's response shape

use serde::{Deserialize, Serialize};

/// Iris species, indexed as in the training targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrisClass {
    Setosa,
    Versicolor,
    Virginia,
}

impl IrisClass {
    pub const ALL: [IrisClass; 3] = [IrisClass::Setosa, IrisClass::Versicolor, IrisClass::Virginia];

    /// Map a model class index to a species
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Label returned to clients
    pub fn label(self) -> &'static str {
        match self {
            IrisClass::Setosa => "Setosa",
            IrisClass::Versicolor => "Versicolor",
            // Spelled as the service has always reported it.
            IrisClass::Virginia => "Virginia",
        }
    }
}

/// Label half of the response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionLabel {
    pub prediction: String,
}

/// Numeric half of the response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionNumber {
    #[serde(rename = "prediction number")]
    pub prediction_number: usize,
}

/// Response body: a two element JSON array, label first, class index second
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrisPrediction(pub PredictionLabel, pub PredictionNumber);

impl IrisPrediction {
    pub fn new(class: IrisClass) -> Self {
        Self(
            PredictionLabel {
                prediction: class.label().to_string(),
            },
            PredictionNumber {
                prediction_number: class.index(),
            },
        )
    }

    pub fn label(&self) -> &str {
        &self.0.prediction
    }

    pub fn class_index(&self) -> usize {
        self.1.prediction_number
    }
}
