use serde::{Deserialize, Serialize};

use crate::models::domain::{Coordinates, QualitySignal, Rate, Rates, RoomType, ScoreBreakdown, Zone};

/// One ranked catalog entry in a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDorm {
    pub name: String,
    #[serde(rename = "location")]
    pub zone: Zone,
    #[serde(rename = "roomTypes")]
    pub room_types: Vec<RoomType>,
    pub rates: Rates,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "buildingYear", skip_serializing_if = "Option::is_none", default)]
    pub building_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    /// Rates that matched the requested room type, cheapest first.
    #[serde(rename = "matchedRates")]
    pub matched_rates: Vec<Rate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub review: Option<QualitySignal>,
    pub score: f64,
    #[serde(rename = "scoreDetails")]
    pub score_details: ScoreBreakdown,
}

/// Response for the ranking endpoint. An empty match set carries an
/// explanatory message instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub dorms: Vec<RankedDorm>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response with an optional detail payload. Validation failures put
/// a field-keyed map in `details`; other failures carry a plain string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Serialize) -> Self {
        Self {
            error: error.into(),
            details: serde_json::to_value(details).ok(),
        }
    }
}
