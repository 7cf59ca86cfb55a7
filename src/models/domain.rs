use serde::{Deserialize, Serialize};

/// Campus zones used by the catalog.
///
/// The catalog only ever references a small closed set of areas, so this is
/// an enum rather than a free-form string. Inbound query strings are matched
/// leniently via [`Zone::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "North Campus")]
    NorthCampus,
    #[serde(rename = "South Campus")]
    SouthCampus,
    #[serde(rename = "West Campus")]
    WestCampus,
    #[serde(rename = "East Campus")]
    EastCampus,
}

impl Zone {
    /// Lenient parse of a zone name. Accepts the canonical form plus the
    /// short variants that show up in user input ("north", "Northside").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "north campus" | "northside" | "north" => Some(Zone::NorthCampus),
            "south campus" | "southside" | "south" => Some(Zone::SouthCampus),
            "west campus" | "westside" | "west" => Some(Zone::WestCampus),
            "east campus" | "eastside" | "east" => Some(Zone::EastCampus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::NorthCampus => "North Campus",
            Zone::SouthCampus => "South Campus",
            Zone::WestCampus => "West Campus",
            Zone::EastCampus => "East Campus",
        }
    }

    /// Whether a free-form zone string from a query refers to this zone.
    pub fn matches(&self, raw: &str) -> bool {
        Zone::parse(raw) == Some(*self)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical room types offered across the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Suite,
    #[serde(rename = "Single Suite")]
    SingleSuite,
}

impl RoomType {
    /// Parse a catalog room-type string. Unknown strings return `None` and
    /// are pruned at load time.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "single" => Some(RoomType::Single),
            "double" => Some(RoomType::Double),
            "suite" => Some(RoomType::Suite),
            "single suite" | "singlesuite" => Some(RoomType::SingleSuite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Suite => "Suite",
            RoomType::SingleSuite => "Single Suite",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A per-room-type rate, normalized to a plain currency amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub amount: f64,
}

/// Overall min/max rate span for dorms that publish a range instead of
/// per-room-type pricing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: f64,
    pub max: f64,
}

/// Rates come in two shapes in the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rates {
    PerType(Vec<Rate>),
    Range(RateRange),
}

/// One catalog record. Immutable after load; the quality signal is attached
/// out-of-band by the quality cache, never stored back onto the entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dorm {
    pub name: String,
    #[serde(rename = "location")]
    pub zone: Zone,
    #[serde(rename = "roomTypes")]
    pub room_types: Vec<RoomType>,
    pub rates: Rates,
    #[serde(rename = "buildingYear", skip_serializing_if = "Option::is_none", default)]
    pub building_year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
}

/// A truncated review attached to a quality signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnippet {
    pub author: String,
    pub rating: f64,
    pub text: String,
}

/// Externally sourced rating/review data for one entity.
///
/// Absence of a signal means "not yet resolved" or "nothing found"; the two
/// are distinguished only inside the quality cache, which stores a negative
/// marker with a shorter TTL for the latter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySignal {
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
    #[serde(rename = "recentReviews", default)]
    pub recent_reviews: Vec<ReviewSnippet>,
    #[serde(rename = "resolvedAt")]
    pub resolved_at: chrono::DateTime<chrono::Utc>,
}

/// A tentative match from the external directory, produced during one
/// resolution attempt and discarded afterwards.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub external_id: String,
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub category_tags: Vec<String>,
    pub formatted_address: String,
}

/// One ranking request's constraints, validated before construction.
#[derive(Debug, Clone)]
pub struct RankQuery {
    pub room_type: String,
    pub max_budget: f64,
    pub zone: String,
}

/// Named sub-scores of one entity's match score. Wire names mirror the
/// search response contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "roomTypeScore")]
    pub room_type: f64,
    #[serde(rename = "priceScore")]
    pub price: f64,
    #[serde(rename = "locationScore")]
    pub zone: f64,
    #[serde(rename = "buildingScore")]
    pub building: f64,
    #[serde(rename = "reviewScore")]
    pub quality: f64,
}

impl ScoreBreakdown {
    /// Raw sum of the sub-scores, before the 0-10 clamp applied by the
    /// match engine.
    pub fn sum(&self) -> f64 {
        self.room_type + self.price + self.zone + self.building + self.quality
    }
}

/// Point budgets for each scoring factor.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub room_type: f64,
    pub price: f64,
    pub zone: f64,
    pub building: f64,
    pub quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            room_type: 4.0,
            price: 3.0,
            zone: 1.0,
            building: 1.0,
            quality: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_parse_variants() {
        assert_eq!(Zone::parse("North Campus"), Some(Zone::NorthCampus));
        assert_eq!(Zone::parse("  north campus "), Some(Zone::NorthCampus));
        assert_eq!(Zone::parse("Southside"), Some(Zone::SouthCampus));
        assert_eq!(Zone::parse("Midtown"), None);
    }

    #[test]
    fn test_room_type_parse() {
        assert_eq!(RoomType::parse("Double"), Some(RoomType::Double));
        assert_eq!(RoomType::parse("single suite"), Some(RoomType::SingleSuite));
        assert_eq!(RoomType::parse("Quad"), None);
    }

    #[test]
    fn test_rates_deserialize_both_shapes() {
        let per_type: Rates =
            serde_json::from_str(r#"[{"type":"Double","amount":3800.0}]"#).unwrap();
        assert!(matches!(per_type, Rates::PerType(ref r) if r.len() == 1));

        let range: Rates = serde_json::from_str(r#"{"min":3200.0,"max":5600.0}"#).unwrap();
        assert!(matches!(range, Rates::Range(r) if r.min == 3200.0));
    }

    #[test]
    fn test_zone_serializes_canonical_name() {
        let json = serde_json::to_string(&Zone::NorthCampus).unwrap();
        assert_eq!(json, r#""North Campus""#);
    }
}
