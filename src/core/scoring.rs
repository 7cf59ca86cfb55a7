use crate::core::filters::{matching_rates, room_type_offered};
use crate::models::{Dorm, QualitySignal, RankQuery, Rate, ScoreBreakdown, ScoringWeights};

/// Total score ceiling. Sub-scores are clamped so the total never exceeds
/// the 0-10 scale.
pub const MAX_TOTAL_SCORE: f64 = 10.0;

/// Price credit reaches zero once the cheapest matching rate hits this
/// multiple of the budget.
pub const PRICE_ZERO_AT_BUDGET_MULTIPLE: f64 = 2.0;

/// Building-age tier boundaries, in years.
pub const AGE_TIER_NEW_YEARS: i32 = 5;
pub const AGE_TIER_RECENT_YEARS: i32 = 10;
pub const AGE_TIER_MODERN_YEARS: i32 = 20;

/// Building-age credit fractions per tier (applied to the building weight).
pub const AGE_CREDIT_NEW: f64 = 1.0;
pub const AGE_CREDIT_RECENT: f64 = 0.95;
pub const AGE_CREDIT_MODERN: f64 = 0.75;
pub const AGE_CREDIT_OLDER: f64 = 0.5;
/// A missing building year gets the neutral mid-tier credit, not zero.
pub const AGE_CREDIT_UNKNOWN: f64 = 0.75;

/// Rating tier boundaries and their credit fractions.
pub const RATING_TIER_EXCELLENT: f64 = 4.5;
pub const RATING_TIER_GOOD: f64 = 4.0;
pub const RATING_TIER_FAIR: f64 = 3.5;
pub const RATING_CREDIT_EXCELLENT: f64 = 0.75;
pub const RATING_CREDIT_GOOD: f64 = 0.6;
pub const RATING_CREDIT_FAIR: f64 = 0.45;
pub const RATING_CREDIT_LOW: f64 = 0.25;

/// Review-volume bonus tiers, stacked on top of the rating credit.
pub const REVIEWS_TIER_HIGH: u32 = 100;
pub const REVIEWS_TIER_MID: u32 = 50;
pub const REVIEWS_BONUS_HIGH: f64 = 0.25;
pub const REVIEWS_BONUS_MID: f64 = 0.125;

/// Credit fraction for entities with no resolved quality signal. Unresolved
/// entities are not penalized down to zero.
pub const QUALITY_CREDIT_NEUTRAL: f64 = 0.5;

/// A scored dorm: clamped total, named sub-scores, and the rates that
/// satisfied the hard filter.
#[derive(Debug, Clone)]
pub struct DormScore {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_rates: Vec<Rate>,
}

/// Deterministic multi-factor scoring of catalog entities against a query.
///
/// The hard filter is evaluated first; a dorm with no rate matching the
/// requested room type never receives a score. The soft sub-scores carry
/// fixed point budgets from [`ScoringWeights`].
#[derive(Debug, Clone)]
pub struct MatchEngine {
    weights: ScoringWeights,
}

impl MatchEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Score one dorm against a query. Returns `None` when the hard filter
    /// excludes the dorm.
    ///
    /// `current_year` is passed explicitly so building-age scoring stays
    /// deterministic under test.
    pub fn score(
        &self,
        dorm: &Dorm,
        query: &RankQuery,
        signal: Option<&QualitySignal>,
        current_year: i32,
    ) -> Option<DormScore> {
        let matched_rates = matching_rates(dorm, &query.room_type);
        if matched_rates.is_empty() {
            return None;
        }

        let room_type = if room_type_offered(dorm, &query.room_type) {
            self.weights.room_type
        } else {
            0.0
        };

        // matching_rates is sorted cheapest-first
        let cheapest = matched_rates[0].amount;
        let price = price_fit(cheapest, query.max_budget) * self.weights.price;

        let zone = if dorm.zone.matches(&query.zone) {
            self.weights.zone
        } else {
            0.0
        };

        let building = building_credit(dorm.building_year, current_year) * self.weights.building;
        let quality = quality_credit(signal) * self.weights.quality;

        let breakdown = ScoreBreakdown {
            room_type,
            price,
            zone,
            building,
            quality,
        };
        let total = breakdown.sum().clamp(0.0, MAX_TOTAL_SCORE);

        Some(DormScore {
            total,
            breakdown,
            matched_rates,
        })
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Price fit fraction (0-1). Full credit at or under budget, decaying
/// linearly to zero at [`PRICE_ZERO_AT_BUDGET_MULTIPLE`] times the budget.
#[inline]
pub fn price_fit(cheapest: f64, max_budget: f64) -> f64 {
    if cheapest <= max_budget {
        return 1.0;
    }
    let overshoot_span = max_budget * (PRICE_ZERO_AT_BUDGET_MULTIPLE - 1.0);
    if overshoot_span <= 0.0 {
        return 0.0;
    }
    (1.0 - (cheapest - max_budget) / overshoot_span).clamp(0.0, 1.0)
}

/// Building-age credit fraction (0-1), tiered by age bands.
#[inline]
pub fn building_credit(building_year: Option<u16>, current_year: i32) -> f64 {
    let Some(year) = building_year else {
        return AGE_CREDIT_UNKNOWN;
    };
    let age = (current_year - i32::from(year)).max(0);
    if age <= AGE_TIER_NEW_YEARS {
        AGE_CREDIT_NEW
    } else if age <= AGE_TIER_RECENT_YEARS {
        AGE_CREDIT_RECENT
    } else if age <= AGE_TIER_MODERN_YEARS {
        AGE_CREDIT_MODERN
    } else {
        AGE_CREDIT_OLDER
    }
}

/// External-quality credit fraction (0-1): rating tier plus review-volume
/// bonus, capped at 1. An absent signal yields the neutral credit.
#[inline]
pub fn quality_credit(signal: Option<&QualitySignal>) -> f64 {
    let Some(signal) = signal else {
        return QUALITY_CREDIT_NEUTRAL;
    };
    let rating_credit = if signal.rating >= RATING_TIER_EXCELLENT {
        RATING_CREDIT_EXCELLENT
    } else if signal.rating >= RATING_TIER_GOOD {
        RATING_CREDIT_GOOD
    } else if signal.rating >= RATING_TIER_FAIR {
        RATING_CREDIT_FAIR
    } else {
        RATING_CREDIT_LOW
    };
    let review_bonus = if signal.review_count >= REVIEWS_TIER_HIGH {
        REVIEWS_BONUS_HIGH
    } else if signal.review_count >= REVIEWS_TIER_MID {
        REVIEWS_BONUS_MID
    } else {
        0.0
    };
    (rating_credit + review_bonus).min(1.0)
}
