use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::RankQuery;

/// Request body for the ranking endpoint.
///
/// Fields are optional at the serde layer so that a missing field produces a
/// field-keyed validation message instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(
        required(message = "Room type is required"),
        length(min = 1, message = "Room type is required")
    )]
    #[serde(alias = "room_type", rename = "roomType")]
    pub room_type: Option<String>,
    #[validate(
        required(message = "Budget is required"),
        range(exclusive_min = 0.0, message = "Budget must be a positive number")
    )]
    #[serde(alias = "max_budget", rename = "maxBudget")]
    pub max_budget: Option<f64>,
    #[validate(
        required(message = "Location is required"),
        length(min = 1, message = "Location is required")
    )]
    pub location: Option<String>,
    /// Optional cap on the number of ranked results. Unset returns all.
    #[serde(default)]
    pub limit: Option<u16>,
}

impl SearchRequest {
    /// Build the internal query from a request that already passed
    /// validation.
    pub fn to_query(&self) -> RankQuery {
        RankQuery {
            room_type: self.room_type.clone().unwrap_or_default(),
            max_budget: self.max_budget.unwrap_or_default(),
            zone: self.location.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(room_type: Option<&str>, budget: Option<f64>, location: Option<&str>) -> SearchRequest {
        SearchRequest {
            room_type: room_type.map(str::to_string),
            max_budget: budget,
            location: location.map(str::to_string),
            limit: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = request(Some("Double"), Some(4000.0), Some("North Campus"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_keyed() {
        let req = request(None, None, None);
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("room_type"));
        assert!(fields.contains_key("max_budget"));
        assert!(fields.contains_key("location"));
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let req = request(Some("Double"), Some(0.0), Some("North Campus"));
        assert!(req.validate().is_err());

        let req = request(Some("Double"), Some(-100.0), Some("North Campus"));
        assert!(req.validate().is_err());
    }
}
