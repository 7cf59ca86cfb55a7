use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Candidate, Coordinates};

/// Errors that can occur when calling the places directory API.
///
/// These never reach the ranking caller; the resolver absorbs them and
/// degrades to an absent quality signal.
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("directory API returned error: {0}")]
    Api(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Fields requested from the details call.
const DETAIL_FIELDS: &str = "name,rating,user_ratings_total,reviews,formatted_address";

/// Client for the external places directory (Google-Places-shaped API).
///
/// Handles the two calls the resolver needs:
/// - Text search biased around a reference coordinate
/// - Place details for an accepted candidate
pub struct PlacesClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PlacesClient {
    /// Create a new places client. Every call carries `timeout` so a slow
    /// directory can never stall a ranking request past its budget.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Run a free-text search biased toward `bias` within `radius_m` meters.
    /// `ZERO_RESULTS` is an empty list, not an error.
    pub async fn text_search(
        &self,
        query: &str,
        bias: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Candidate>, PlacesError> {
        let url = format!(
            "{}/textsearch/json?query={}&location={},{}&radius={}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            bias.lat,
            bias.lng,
            radius_m,
            self.api_key
        );

        tracing::debug!("directory text search: \"{}\"", query);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlacesError::Api(format!(
                "text search failed: {}",
                response.status()
            )));
        }

        let body: TextSearchResponse = response.json().await?;
        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => return Err(PlacesError::Api(other.to_string())),
        }

        Ok(body.results.into_iter().map(Candidate::from).collect())
    }

    /// Fetch rating/review details for one place id.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = format!(
            "{}/details/json?place_id={}&fields={}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(place_id),
            DETAIL_FIELDS,
            self.api_key
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlacesError::Api(format!(
                "details fetch failed: {}",
                response.status()
            )));
        }

        let body: DetailsResponse = response.json().await?;
        if body.status != "OK" {
            return Err(PlacesError::Api(body.status));
        }

        body.result
            .ok_or_else(|| PlacesError::InvalidResponse("missing result object".into()))
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    place_id: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    formatted_address: String,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl From<SearchResult> for Candidate {
    fn from(result: SearchResult) -> Self {
        Candidate {
            external_id: result.place_id,
            name: result.name,
            coordinates: result.geometry.map(|g| g.location),
            category_tags: result.types,
            formatted_address: result.formatted_address,
        }
    }
}

/// Detail record for an accepted candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
    #[serde(default)]
    pub formatted_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: f64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_client_creation() {
        let client = PlacesClient::new(
            "https://places.test/api".to_string(),
            "test_key".to_string(),
            Duration::from_secs(5),
        );

        assert_eq!(client.base_url, "https://places.test/api");
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_search_result_to_candidate() {
        let json = r#"{
            "name": "Hullabaloo Hall",
            "place_id": "abc123",
            "types": ["university", "point_of_interest"],
            "formatted_address": "449 Polo Rd, College Station, TX 77843",
            "geometry": {"location": {"lat": 30.6225, "lng": -96.3376}}
        }"#;
        let result: SearchResult = serde_json::from_str(json).unwrap();
        let candidate = Candidate::from(result);

        assert_eq!(candidate.external_id, "abc123");
        assert_eq!(candidate.category_tags.len(), 2);
        assert!(candidate.coordinates.is_some());
    }

    #[test]
    fn test_details_response_tolerates_missing_fields() {
        let json = r#"{"result": {"name": "Hobby Hall"}, "status": "OK"}"#;
        let body: DetailsResponse = serde_json::from_str(json).unwrap();
        let details = body.result.unwrap();

        assert_eq!(details.name, "Hobby Hall");
        assert!(details.rating.is_none());
        assert!(details.reviews.is_empty());
    }
}
