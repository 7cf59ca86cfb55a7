//! DormMatch - dorm ranking service for campus housing search
//!
//! This library combines user-stated constraints with externally sourced
//! quality signals to produce a ranked, explainable list of housing options.
//! The pipeline hard-filters on room type, resolves rating/review data
//! through a TTL cache, and scores each entity on a fixed 0-10 scale.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchEngine, RankOutcome, Ranker};
pub use crate::models::{
    Dorm, QualitySignal, RankQuery, RankedDorm, Rate, Rates, RoomType, ScoreBreakdown,
    ScoringWeights, SearchRequest, SearchResponse, Zone,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let engine = MatchEngine::with_default_weights();
        let dorm = Dorm {
            name: "Hall A".to_string(),
            zone: Zone::NorthCampus,
            room_types: vec![RoomType::Double],
            rates: Rates::PerType(vec![Rate {
                room_type: RoomType::Double,
                amount: 3800.0,
            }]),
            building_year: Some(2015),
            coordinates: None,
            amenities: vec![],
        };
        let query = RankQuery {
            room_type: "Double".to_string(),
            max_budget: 4000.0,
            zone: "North Campus".to_string(),
        };

        let score = engine.score(&dorm, &query, None, 2025).unwrap();
        assert!(score.total > 0.0);
    }
}
