//! Type definitions for predictions and response bodies

pub mod housing;
pub mod iris;

pub use housing::HousingPrediction;
pub use iris::{IrisClass, IrisPrediction};

use serde::{Deserialize, Serialize};

/// Error body shared by both services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
