use std::future::Future;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

use crate::models::QualitySignal;

/// One cached resolution outcome. A resolution that found nothing is stored
/// as an explicit negative marker so it ages out on the shorter TTL and
/// retries stay bounded.
#[derive(Debug, Clone)]
enum Lookup {
    Found(QualitySignal),
    NotFound,
}

/// Per-entry TTL policy: found signals live for the positive TTL, negative
/// markers for the shorter negative TTL.
struct LookupExpiry {
    found_ttl: Duration,
    not_found_ttl: Duration,
}

impl Expiry<String, Lookup> for LookupExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Lookup,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match value {
            Lookup::Found(_) => self.found_ttl,
            Lookup::NotFound => self.not_found_ttl,
        })
    }
}

/// TTL cache of resolved quality signals, keyed by entity name.
///
/// Entries are replaced on refresh after expiry, never mutated. Concurrent
/// callers for the same uncached entity share a single in-flight resolution
/// (the single-flight property comes from `moka`'s coalescing `get_with`).
pub struct QualityCache {
    entries: Cache<String, Lookup>,
}

impl QualityCache {
    pub fn new(max_capacity: u64, found_ttl: Duration, not_found_ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(LookupExpiry {
                found_ttl,
                not_found_ttl,
            })
            .build();
        Self { entries }
    }

    /// Return the cached signal for an entity, resolving it at most once
    /// across all concurrent callers when absent or expired.
    ///
    /// The cache knows nothing about the query that triggered resolution;
    /// it is keyed by entity identity only.
    pub async fn get_or_resolve<F, Fut>(&self, entity_id: &str, resolve: F) -> Option<QualitySignal>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<QualitySignal>> + Send,
    {
        let lookup = self
            .entries
            .get_with(entity_id.to_string(), async move {
                match resolve().await {
                    Some(signal) => Lookup::Found(signal),
                    None => Lookup::NotFound,
                }
            })
            .await;

        match lookup {
            Lookup::Found(signal) => Some(signal),
            Lookup::NotFound => None,
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Drop one entity's entry, forcing re-resolution on the next lookup.
    pub async fn invalidate(&self, entity_id: &str) {
        self.entries.invalidate(entity_id).await;
    }
}
