use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::filters::matching_rates;
use crate::core::scoring::MatchEngine;
use crate::models::{Coordinates, Dorm, QualitySignal, RankQuery, RankedDorm};
use crate::services::{EntityResolver, QualityCache};

/// Result of one ranking pass.
#[derive(Debug)]
pub struct RankOutcome {
    pub ranked: Vec<RankedDorm>,
    pub total_considered: usize,
}

/// Ranking orchestrator.
///
/// # Pipeline
/// 1. Hard-filter the catalog on the requested room type
/// 2. Resolve quality signals for survivors through the cache, behind a
///    bounded worker pool
/// 3. Score each survivor and sort descending, name-ascending on ties
///
/// A single entity's resolution failure never fails the whole pass; the
/// entity is scored with the neutral quality credit instead.
pub struct Ranker {
    engine: MatchEngine,
    resolver: Arc<EntityResolver>,
    quality: Arc<QualityCache>,
    reference: Coordinates,
    concurrency: usize,
}

impl Ranker {
    pub fn new(
        engine: MatchEngine,
        resolver: Arc<EntityResolver>,
        quality: Arc<QualityCache>,
        reference: Coordinates,
        concurrency: usize,
    ) -> Self {
        Self {
            engine,
            resolver,
            quality,
            reference,
            concurrency: concurrency.max(1),
        }
    }

    /// Rank the catalog against a query, returning at most `top_k` entries
    /// when set.
    pub async fn rank(
        &self,
        catalog: &[Dorm],
        query: &RankQuery,
        top_k: Option<usize>,
    ) -> RankOutcome {
        let total_considered = catalog.len();

        let survivors: Vec<Dorm> = catalog
            .iter()
            .filter(|dorm| !matching_rates(dorm, &query.room_type).is_empty())
            .cloned()
            .collect();

        tracing::debug!(
            "{} of {} dorms passed the room-type filter",
            survivors.len(),
            total_considered
        );

        let signals = self.resolve_signals(&survivors).await;
        let current_year = Utc::now().year();

        let mut ranked: Vec<RankedDorm> = survivors
            .into_iter()
            .filter_map(|dorm| {
                let signal = signals.get(&dorm.name).cloned().flatten();
                let score = self
                    .engine
                    .score(&dorm, query, signal.as_ref(), current_year)?;
                Some(RankedDorm {
                    name: dorm.name,
                    zone: dorm.zone,
                    room_types: dorm.room_types,
                    rates: dorm.rates,
                    coordinates: dorm.coordinates,
                    building_year: dorm.building_year,
                    amenities: dorm.amenities,
                    matched_rates: score.matched_rates,
                    review: signal,
                    score: score.total,
                    score_details: score.breakdown,
                })
            })
            .collect();

        // Deterministic order: score descending, then name ascending
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        if let Some(top_k) = top_k {
            ranked.truncate(top_k);
        }

        RankOutcome {
            ranked,
            total_considered,
        }
    }

    /// Fan quality-signal resolution out across a bounded worker pool.
    ///
    /// Each worker goes through the cache, so concurrent ranking requests
    /// for overlapping entities still produce at most one outbound
    /// resolution per entity.
    async fn resolve_signals(&self, dorms: &[Dorm]) -> HashMap<String, Option<QualitySignal>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for dorm in dorms {
            let name = dorm.name.clone();
            let resolver = Arc::clone(&self.resolver);
            let quality = Arc::clone(&self.quality);
            let semaphore = Arc::clone(&semaphore);
            let reference = self.reference;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (name, None),
                };
                let signal = quality
                    .get_or_resolve(&name, {
                        let lookup = name.clone();
                        move || async move { resolver.resolve(&lookup, reference).await }
                    })
                    .await;
                (name, signal)
            });
        }

        let mut signals = HashMap::with_capacity(dorms.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, signal)) => {
                    signals.insert(name, signal);
                }
                Err(e) => {
                    tracing::warn!("quality resolution task failed: {}", e);
                }
            }
        }
        signals
    }
}
