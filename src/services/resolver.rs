use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::core::distance::{proximity_band, ProximityBand};
use crate::models::{Candidate, Coordinates, QualitySignal, ReviewSnippet};
use crate::services::places::PlacesClient;

/// Minimum candidate score required to accept a directory match.
pub const ACCEPT_THRESHOLD: i32 = 3;

/// Candidate scoring weights. Name containment dominates; proximity and
/// category membership break ties between plausible listings.
pub const NAME_FORWARD_WEIGHT: i32 = 3;
pub const NAME_REVERSE_WEIGHT: i32 = 2;
pub const CATEGORY_WEIGHT: i32 = 1;
pub const LOCALITY_WEIGHT: i32 = 1;
pub const NEAR_WEIGHT: i32 = 2;
pub const MID_WEIGHT: i32 = 1;

/// How many recent reviews to keep on a resolved signal.
pub const RECENT_REVIEW_LIMIT: usize = 3;
/// Review text is truncated to this many characters, ellipsis-marked.
pub const REVIEW_TEXT_LIMIT: usize = 200;

/// Directory category tags that mark a candidate as plausibly a campus
/// residence.
pub const ALLOWED_CATEGORY_TAGS: [&str; 4] =
    ["university", "lodging", "establishment", "point_of_interest"];

/// Tokens too generic to count as a shared name word in the false-positive
/// guard.
const GENERIC_NAME_TOKENS: [&str; 8] = [
    "hall",
    "dorm",
    "dormitory",
    "residence",
    "university",
    "college",
    "station",
    "the",
];

/// Resolves a catalog entity's external identity through a fallback query
/// list with candidate scoring, then fetches its quality signal.
///
/// Every directory failure is absorbed here: the caller always receives a
/// signal or `None`, never an error.
pub struct EntityResolver {
    places: Arc<PlacesClient>,
    institution: String,
    locality: String,
    radius_m: u32,
    /// Alias table for names known to collide with unrelated listings,
    /// keyed by lowercased entity name. Data-driven via configuration.
    aliases: HashMap<String, Vec<String>>,
}

impl EntityResolver {
    pub fn new(
        places: Arc<PlacesClient>,
        institution: String,
        locality: String,
        radius_m: u32,
        aliases: HashMap<String, Vec<String>>,
    ) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(name, list)| (name.to_lowercase(), list))
            .collect();
        Self {
            places,
            institution,
            locality,
            radius_m,
            aliases,
        }
    }

    /// Resolve one entity. Tries each query template in order until a result
    /// set produces a candidate at or above the acceptance threshold, then
    /// fetches details and applies the false-positive guard.
    pub async fn resolve(
        &self,
        entity_name: &str,
        reference: Coordinates,
    ) -> Option<QualitySignal> {
        for query in self.build_queries(entity_name) {
            let candidates = match self.places.text_search(&query, reference, self.radius_m).await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    // A transient failure is equivalent to an empty result
                    // for this query
                    tracing::warn!("query \"{}\" failed: {}", query, e);
                    continue;
                }
            };
            if candidates.is_empty() {
                tracing::debug!("query \"{}\" returned no candidates", query);
                continue;
            }

            let best = candidates
                .iter()
                .max_by_key(|candidate| self.score_candidate(candidate, entity_name, reference))?;
            let best_score = self.score_candidate(best, entity_name, reference);

            if best_score < ACCEPT_THRESHOLD {
                tracing::debug!(
                    "best candidate \"{}\" scored {} below threshold for \"{}\"",
                    best.name,
                    best_score,
                    entity_name
                );
                continue;
            }

            tracing::debug!(
                "accepted \"{}\" (score {}) for \"{}\" via query \"{}\"",
                best.name,
                best_score,
                entity_name,
                query
            );
            return self.fetch_signal(best, entity_name).await;
        }

        tracing::debug!("no directory match for \"{}\"", entity_name);
        None
    }

    /// Ordered query templates for an entity. An alias-table entry overrides
    /// the generated list entirely.
    fn build_queries(&self, entity_name: &str) -> Vec<String> {
        if let Some(aliases) = self.aliases.get(&entity_name.to_lowercase()) {
            if !aliases.is_empty() {
                return aliases.clone();
            }
        }

        let mut queries = vec![format!("{} {}", entity_name, self.institution)];
        if let Some(base) = entity_name.strip_suffix(" Hall") {
            queries.push(format!("{} Residence Hall {}", base, self.institution));
            queries.push(format!("{} Dorm {}", base, self.institution));
            queries.push(format!("{} Residence Hall", base));
            queries.push(format!("{} Dorm", base));
        }
        queries.push(entity_name.to_string());
        queries
    }

    /// Integer score for one candidate against the entity name and the
    /// campus reference point.
    fn score_candidate(
        &self,
        candidate: &Candidate,
        entity_name: &str,
        reference: Coordinates,
    ) -> i32 {
        let candidate_name = candidate.name.to_lowercase();
        let target = entity_name.to_lowercase();
        let mut score = 0;

        if candidate_name.contains(&target) {
            score += NAME_FORWARD_WEIGHT;
        }
        if target.contains(&candidate_name) {
            score += NAME_REVERSE_WEIGHT;
        }
        if candidate
            .category_tags
            .iter()
            .any(|tag| ALLOWED_CATEGORY_TAGS.contains(&tag.as_str()))
        {
            score += CATEGORY_WEIGHT;
        }
        if candidate
            .formatted_address
            .to_lowercase()
            .contains(&self.locality.to_lowercase())
        {
            score += LOCALITY_WEIGHT;
        }
        if let Some(coordinates) = candidate.coordinates {
            score += match proximity_band(reference, coordinates) {
                ProximityBand::Near => NEAR_WEIGHT,
                ProximityBand::Mid => MID_WEIGHT,
                ProximityBand::Far => 0,
            };
        }

        score
    }

    /// Fetch details for an accepted candidate and build the quality signal.
    /// Returns `None` on any fetch failure or when the guard rejects the
    /// detail record as a false positive.
    async fn fetch_signal(
        &self,
        candidate: &Candidate,
        entity_name: &str,
    ) -> Option<QualitySignal> {
        let details = match self.places.place_details(&candidate.external_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("details fetch failed for \"{}\": {}", entity_name, e);
                return None;
            }
        };

        if !self.name_guard(&details.name, entity_name) {
            tracing::info!(
                "discarding \"{}\" as a false positive for \"{}\"",
                details.name,
                entity_name
            );
            return None;
        }

        let recent_reviews = details
            .reviews
            .iter()
            .take(RECENT_REVIEW_LIMIT)
            .map(|review| ReviewSnippet {
                author: review.author_name.clone(),
                rating: review.rating,
                text: truncate_review(&review.text),
            })
            .collect();

        Some(QualitySignal {
            rating: details.rating.unwrap_or(0.0).clamp(0.0, 5.0),
            review_count: details.user_ratings_total.unwrap_or(0),
            recent_reviews,
            resolved_at: Utc::now(),
        })
    }

    /// The detail record's name must contain, be contained by, or share a
    /// significant token with the entity name, or match a known alias.
    fn name_guard(&self, place_name: &str, entity_name: &str) -> bool {
        let place = place_name.to_lowercase();
        let entity = entity_name.to_lowercase();

        if place.contains(&entity) || entity.contains(&place) {
            return true;
        }

        let significant = |word: &&str| word.len() >= 4 && !GENERIC_NAME_TOKENS.contains(word);
        let place_words: Vec<&str> = place.split_whitespace().filter(significant).collect();
        if entity
            .split_whitespace()
            .filter(significant)
            .any(|word| place_words.contains(&word))
        {
            return true;
        }

        if let Some(aliases) = self.aliases.get(&entity) {
            return aliases.iter().any(|alias| {
                let alias = alias.to_lowercase();
                place.contains(&alias) || alias.contains(&place)
            });
        }

        false
    }
}

/// Truncate review text to the fixed character bound, appending an ellipsis
/// marker when anything was cut.
fn truncate_review(text: &str) -> String {
    if text.chars().count() <= REVIEW_TEXT_LIMIT {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(REVIEW_TEXT_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CAMPUS: Coordinates = Coordinates {
        lat: 30.6280,
        lng: -96.3344,
    };

    fn test_resolver(aliases: HashMap<String, Vec<String>>) -> EntityResolver {
        let places = Arc::new(PlacesClient::new(
            "http://127.0.0.1:1".to_string(),
            "test_key".to_string(),
            Duration::from_millis(50),
        ));
        EntityResolver::new(
            places,
            "Texas A&M University".to_string(),
            "College Station".to_string(),
            5000,
            aliases,
        )
    }

    fn candidate(name: &str, tags: &[&str], address: &str, coords: Option<Coordinates>) -> Candidate {
        Candidate {
            external_id: "place-1".to_string(),
            name: name.to_string(),
            coordinates: coords,
            category_tags: tags.iter().map(|t| t.to_string()).collect(),
            formatted_address: address.to_string(),
        }
    }

    #[test]
    fn test_query_templates_for_hall_name() {
        let resolver = test_resolver(HashMap::new());
        let queries = resolver.build_queries("Mosher Hall");

        assert_eq!(queries[0], "Mosher Hall Texas A&M University");
        assert!(queries.contains(&"Mosher Residence Hall Texas A&M University".to_string()));
        assert!(queries.contains(&"Mosher Dorm".to_string()));
        assert_eq!(queries.last().unwrap(), "Mosher Hall");
    }

    #[test]
    fn test_alias_table_overrides_templates() {
        let mut aliases = HashMap::new();
        aliases.insert(
            "Hullabaloo Hall".to_string(),
            vec![
                "Hullabaloo Hall".to_string(),
                "Hullabaloo".to_string(),
                "Hullabaloo Residence Hall".to_string(),
            ],
        );
        let resolver = test_resolver(aliases);

        let queries = resolver.build_queries("Hullabaloo Hall");
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[1], "Hullabaloo");
    }

    #[test]
    fn test_candidate_scoring_weights() {
        let resolver = test_resolver(HashMap::new());

        // Full name match, allowed tag, locality, near campus
        let strong = candidate(
            "Mosher Hall",
            &["university"],
            "Houston St, College Station, TX",
            Some(Coordinates {
                lat: 30.6290,
                lng: -96.3350,
            }),
        );
        let score = resolver.score_candidate(&strong, "Mosher Hall", CAMPUS);
        assert_eq!(
            score,
            NAME_FORWARD_WEIGHT + NAME_REVERSE_WEIGHT + CATEGORY_WEIGHT + LOCALITY_WEIGHT + NEAR_WEIGHT
        );

        // Unrelated business far away shares nothing
        let weak = candidate(
            "Mosher Plumbing Supply",
            &["store"],
            "Dallas, TX",
            Some(Coordinates {
                lat: 32.7767,
                lng: -96.7970,
            }),
        );
        let score = resolver.score_candidate(&weak, "Krueger Hall", CAMPUS);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_name_guard_containment_and_tokens() {
        let resolver = test_resolver(HashMap::new());

        assert!(resolver.name_guard("Mosher Hall - Texas A&M", "Mosher Hall"));
        assert!(resolver.name_guard("Mosher", "Mosher Hall"));
        // Shares only the generic token "hall"
        assert!(!resolver.name_guard("City Hall", "Mosher Hall"));
        assert!(!resolver.name_guard("Northgate Apartments", "Mosher Hall"));
    }

    #[test]
    fn test_name_guard_accepts_alias() {
        // "University Terrace" shares no significant token with the entity
        // name, so only the alias table can make it pass
        let mut aliases = HashMap::new();
        aliases.insert(
            "The Gardens Apartments".to_string(),
            vec!["University Terrace".to_string()],
        );
        let resolver = test_resolver(aliases);

        assert!(resolver.name_guard("University Terrace Complex", "The Gardens Apartments"));

        let bare = test_resolver(HashMap::new());
        assert!(!bare.name_guard("University Terrace Complex", "The Gardens Apartments"));
    }

    #[test]
    fn test_truncate_review_bounds() {
        let short = "Great dorm, friendly staff.";
        assert_eq!(truncate_review(short), short);

        let long = "a".repeat(REVIEW_TEXT_LIMIT + 50);
        let truncated = truncate_review(&long);
        assert_eq!(truncated.chars().count(), REVIEW_TEXT_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn test_unreachable_directory_resolves_to_absent() {
        let resolver = test_resolver(HashMap::new());
        let signal = resolver.resolve("Mosher Hall", CAMPUS).await;
        assert!(signal.is_none());
    }
}
