use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Coordinates, Dorm, Rate, RateRange, Rates, RoomType, Zone};

/// Errors that can occur when loading the catalog sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog source is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog structure: {0}")]
    InvalidStructure(String),
}

struct Snapshot {
    dorms: Arc<Vec<Dorm>>,
    loaded_at: Instant,
}

/// Loads, validates, and normalizes the fixed catalog, merging coordinates
/// from a secondary name-keyed source.
///
/// The loaded catalog is cached for a bounded TTL and treated as read-only
/// between refreshes. Refreshing is single-flight: concurrent requests
/// arriving on a stale cache share one reload.
pub struct CatalogStore {
    dorms_path: PathBuf,
    coords_path: PathBuf,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    refresh: Mutex<()>,
}

impl CatalogStore {
    pub fn new(
        dorms_path: impl Into<PathBuf>,
        coords_path: impl Into<PathBuf>,
        ttl: Duration,
    ) -> Self {
        Self {
            dorms_path: dorms_path.into(),
            coords_path: coords_path.into(),
            ttl,
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the catalog, re-reading and re-validating the sources when the
    /// cached snapshot has expired. A failed refresh falls back to the stale
    /// snapshot when one exists.
    pub async fn load(&self) -> Result<Arc<Vec<Dorm>>, CatalogError> {
        if let Some(dorms) = self.fresh().await {
            return Ok(dorms);
        }

        let _guard = self.refresh.lock().await;
        // Another request may have refreshed while we waited for the guard
        if let Some(dorms) = self.fresh().await {
            return Ok(dorms);
        }

        match self.read_catalog().await {
            Ok(dorms) => {
                let dorms = Arc::new(dorms);
                let mut snapshot = self.snapshot.write().await;
                *snapshot = Some(Snapshot {
                    dorms: Arc::clone(&dorms),
                    loaded_at: Instant::now(),
                });
                Ok(dorms)
            }
            Err(e) => {
                let stale = self.snapshot.read().await.as_ref().map(|s| Arc::clone(&s.dorms));
                match stale {
                    Some(dorms) => {
                        tracing::warn!("catalog refresh failed, serving stale snapshot: {}", e);
                        Ok(dorms)
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn fresh(&self) -> Option<Arc<Vec<Dorm>>> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .as_ref()
            .filter(|s| s.loaded_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.dorms))
    }

    async fn read_catalog(&self) -> Result<Vec<Dorm>, CatalogError> {
        let raw = read_source(&self.dorms_path).await?;
        let root: Value = serde_json::from_str(&raw)?;
        let records = root
            .get("dorms")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CatalogError::InvalidStructure("expected a top-level `dorms` array".to_string())
            })?;

        let coordinates = self.read_coordinates().await;

        let dorms: Vec<Dorm> = records
            .iter()
            .filter_map(|record| parse_dorm(record, &coordinates))
            .collect();

        tracing::info!(
            "loaded {} of {} catalog records ({} with coordinates)",
            dorms.len(),
            records.len(),
            dorms.iter().filter(|d| d.coordinates.is_some()).count()
        );
        Ok(dorms)
    }

    /// The coordinate source is best-effort: when missing or corrupt the
    /// catalog still loads, entities just keep `coordinates = None`.
    async fn read_coordinates(&self) -> HashMap<String, Coordinates> {
        let raw = match read_source(&self.coords_path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("coordinate source unavailable: {}", e);
                return HashMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("coordinate source is not valid JSON: {}", e);
                HashMap::new()
            }
        }
    }
}

async fn read_source(path: &Path) -> Result<String, CatalogError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse one catalog record leniently: malformed rate entries and unknown
/// room-type strings are pruned with a warning; a record missing a required
/// field is dropped entirely without failing the load.
fn parse_dorm(record: &Value, coordinates: &HashMap<String, Coordinates>) -> Option<Dorm> {
    let name = match record.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            tracing::warn!("dropping catalog record without a name");
            return None;
        }
    };

    let zone = match record
        .get("location")
        .and_then(Value::as_str)
        .and_then(Zone::parse)
    {
        Some(zone) => zone,
        None => {
            tracing::warn!("dropping \"{}\": missing or unknown location", name);
            return None;
        }
    };

    let room_types = match record.get("roomTypes").and_then(Value::as_array) {
        Some(raw_types) => {
            let parsed: Vec<RoomType> = raw_types
                .iter()
                .filter_map(|value| match value.as_str().and_then(RoomType::parse) {
                    Some(room_type) => Some(room_type),
                    None => {
                        tracing::warn!("pruning unrecognized room type {} on \"{}\"", value, name);
                        None
                    }
                })
                .collect();
            if parsed.is_empty() {
                tracing::warn!("dropping \"{}\": no valid room types", name);
                return None;
            }
            parsed
        }
        None => {
            tracing::warn!("dropping \"{}\": missing roomTypes", name);
            return None;
        }
    };

    let rates = match record.get("rates") {
        Some(raw_rates) => parse_rates(raw_rates, &name)?,
        None => {
            tracing::warn!("dropping \"{}\": missing rates", name);
            return None;
        }
    };

    let building_year = record
        .get("buildingInfo")
        .and_then(|info| info.get("yearBuilt"))
        .and_then(parse_year);

    let coords = coordinates
        .get(&name)
        .copied()
        .or_else(|| parse_coordinates(record.get("coordinates")?));

    let amenities = record
        .get("amenities")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Dorm {
        name,
        zone,
        room_types,
        rates,
        building_year,
        coordinates: coords,
        amenities,
    })
}

fn parse_rates(raw: &Value, name: &str) -> Option<Rates> {
    if let Some(entries) = raw.as_array() {
        let rates: Vec<Rate> = entries
            .iter()
            .filter_map(|entry| {
                let room_type = entry
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(RoomType::parse);
                let amount = entry
                    .get("rate")
                    .or_else(|| entry.get("amount"))
                    .and_then(parse_amount);
                match (room_type, amount) {
                    (Some(room_type), Some(amount)) => Some(Rate { room_type, amount }),
                    _ => {
                        tracing::warn!("pruning malformed rate entry {} on \"{}\"", entry, name);
                        None
                    }
                }
            })
            .collect();
        return Some(Rates::PerType(rates));
    }

    if let Some(object) = raw.as_object() {
        let min = object.get("min").and_then(parse_amount);
        let max = object.get("max").and_then(parse_amount);
        if let (Some(min), Some(max)) = (min, max) {
            return Some(Rates::Range(RateRange { min, max }));
        }
    }

    tracing::warn!("dropping \"{}\": unrecognized rates shape", name);
    None
}

/// Amounts come as plain numbers or formatted strings like "$3,462".
fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(raw) => raw.replace(['$', ','], "").trim().parse().ok()?,
        _ => return None,
    };
    (amount >= 0.0).then_some(amount)
}

fn parse_year(value: &Value) -> Option<u16> {
    let year = match value {
        Value::Number(number) => u16::try_from(number.as_u64()?).ok()?,
        Value::String(raw) => raw.trim().parse().ok()?,
        _ => return None,
    };
    (year > 0).then_some(year)
}

fn parse_coordinates(value: &Value) -> Option<Coordinates> {
    serde_json::from_value(value.clone()).ok()
}
