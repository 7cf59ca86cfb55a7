// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use distance::{haversine_distance, proximity_band, ProximityBand};
pub use filters::{matching_rates, requested_matches, room_type_offered};
pub use ranker::{RankOutcome, Ranker};
pub use scoring::{DormScore, MatchEngine};
