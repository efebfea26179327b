//! California housing regressor response shape

use serde::{Deserialize, Serialize};

/// Response body for the housing service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HousingPrediction {
    /// Predicted median house value, in units of 100,000 USD
    pub prediction1: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_field_body() {
        let body = serde_json::to_value(HousingPrediction { prediction1: 4.25 }).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["prediction1"], 4.25);
    }
}
