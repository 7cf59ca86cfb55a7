use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub places: PlacesSettings,
    pub catalog: CatalogSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_institution")]
    pub institution: String,
    #[serde(default = "default_locality")]
    pub locality: String,
    #[serde(default)]
    pub reference: ReferenceSettings,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default = "default_places_timeout")]
    pub timeout_secs: u64,
    /// Alias table for entity names that collide with unrelated external
    /// listings. Keys are matched case-insensitively.
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, Vec<String>>,
}

/// Campus reference point used to bias directory searches and band
/// candidate proximity.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReferenceSettings {
    pub lat: f64,
    pub lng: f64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            lat: 30.6280,
            lng: -96.3344,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_dorms_path")]
    pub dorms_path: String,
    #[serde(default = "default_coords_path")]
    pub coords_path: String,
    #[serde(default = "default_catalog_ttl")]
    pub ttl_secs: u64,
    /// Load the catalog eagerly at startup and treat a failure as fatal.
    #[serde(default = "default_true")]
    pub preload: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Shorter TTL for "nothing found" markers so retries are allowed
    /// sooner.
    #[serde(default = "default_negative_ttl")]
    pub negative_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Concurrent outbound resolutions per ranking request.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_room_type_weight")]
    pub room_type: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_zone_weight")]
    pub zone: f64,
    #[serde(default = "default_building_weight")]
    pub building: f64,
    #[serde(default = "default_quality_weight")]
    pub quality: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            room_type: default_room_type_weight(),
            price: default_price_weight(),
            zone: default_zone_weight(),
            building: default_building_weight(),
            quality: default_quality_weight(),
        }
    }
}

fn default_room_type_weight() -> f64 { 4.0 }
fn default_price_weight() -> f64 { 3.0 }
fn default_zone_weight() -> f64 { 1.0 }
fn default_building_weight() -> f64 { 1.0 }
fn default_quality_weight() -> f64 { 2.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_window")]
    pub window_secs: u64,
    #[serde(default = "default_rate_max")]
    pub max_requests: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_places_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}
fn default_institution() -> String { "Texas A&M University".to_string() }
fn default_locality() -> String { "College Station".to_string() }
fn default_radius_m() -> u32 { 5000 }
fn default_places_timeout() -> u64 { 5 }
fn default_dorms_path() -> String { "data/dorms.json".to_string() }
fn default_coords_path() -> String { "data/dormcords.json".to_string() }
fn default_catalog_ttl() -> u64 { 300 }
fn default_cache_ttl() -> u64 { 600 }
fn default_negative_ttl() -> u64 { 120 }
fn default_cache_capacity() -> u64 { 1024 }
fn default_concurrency() -> usize { 6 }
fn default_max_limit() -> u16 { 100 }
fn default_rate_window() -> u64 { 900 }
fn default_rate_max() -> u32 { 100 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }
fn default_true() -> bool { true }

/// Dorm names known to resolve badly through the generated query templates.
fn default_aliases() -> HashMap<String, Vec<String>> {
    let special_cases = [
        (
            "Hullabaloo Hall",
            vec![
                "Hullabaloo Hall",
                "Hullabaloo",
                "Hullabaloo Dorm",
                "Hullabaloo Residence Hall",
            ],
        ),
        (
            "Hobby Hall",
            vec!["Hobby Hall", "Hobby Dorm", "Hobby Residence Hall"],
        ),
        (
            "Moses Hall",
            vec!["Moses Hall", "Moses Dorm", "Moses Residence Hall"],
        ),
        (
            "Mosher Hall",
            vec!["Mosher Hall", "Mosher Dorm", "Mosher Residence Hall"],
        ),
    ];
    special_cases
        .into_iter()
        .map(|(name, queries)| {
            (
                name.to_string(),
                queries.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with DORM_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with DORM_)
            // e.g., DORM_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("DORM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("DORM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the directory API key from the environment. The deployment sets
/// GOOGLE_MAPS_API_KEY; DORM_PLACES__API_KEY also works.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("GOOGLE_MAPS_API_KEY")
        .or_else(|_| env::var("DORM_PLACES__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);
    if let Some(api_key) = api_key {
        builder = builder.set_override("places.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.room_type, 4.0);
        assert_eq!(weights.price, 3.0);
        assert_eq!(weights.zone, 1.0);
        assert_eq!(weights.building, 1.0);
        assert_eq!(weights.quality, 2.0);
    }

    #[test]
    fn test_default_aliases_cover_colliding_names() {
        let aliases = default_aliases();
        assert!(aliases.contains_key("Hullabaloo Hall"));
        assert!(aliases["Mosher Hall"]
            .iter()
            .any(|query| query == "Mosher Dorm"));
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }
}
