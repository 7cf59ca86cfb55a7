// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, Coordinates, Dorm, QualitySignal, RankQuery, Rate, RateRange, Rates, ReviewSnippet,
    RoomType, ScoreBreakdown, ScoringWeights, Zone,
};
pub use requests::SearchRequest;
pub use responses::{ErrorResponse, HealthResponse, RankedDorm, SearchResponse};
