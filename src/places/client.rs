// src/places/client.rs
use crate::config::PlacesConfig;
use crate::places::types::{DetailsResponse, PlaceDetails, PlaceSummary, TextSearchResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};

const DETAILS_FIELDS: &str = "name,formatted_address,price_level,types,website,\
formatted_phone_number,rating,user_ratings_total,opening_hours,reviews";

pub struct PlacesClient {
    api_key: Option<String>,
    base_url: String,
    location_bias: String,
    radius_meters: u32,
    client: Client,
}

impl PlacesClient {
    pub fn new(config: &PlacesConfig, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("MAPS_API_KEY not set - place lookups will be unavailable");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url: config.base_url.clone(),
            location_bias: config.location_bias.clone(),
            radius_meters: config.radius_meters,
            client,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Text-search for a venue by name, biased around the configured center.
    /// Returns the first hit, which the upstream ranks as the best match.
    pub async fn search_venue(
        &self,
        name: &str,
    ) -> Result<Option<PlaceSummary>, Box<dyn std::error::Error + Send + Sync>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or("MAPS_API_KEY environment variable required")?;

        debug!("Searching for '{}' near {}", name, self.location_bias);

        let url = format!("{}/maps/api/place/textsearch/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", name),
                ("location", &self.location_bias),
                ("radius", &self.radius_meters.to_string()),
                ("key", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Text search returned status {}", response.status());
            return Ok(None);
        }

        let data: TextSearchResponse = response.json().await?;
        debug!("Text search status: {} ({} results)", data.status, data.results.len());

        Ok(data.results.into_iter().next())
    }

    /// Fetch details (website, phone, reviews, ...) for one place.
    /// Lookup trouble is not fatal to the run: any failure path logs and
    /// yields `None` so the caller can skip the venue.
    pub async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        let api_key = match self.api_key.as_deref() {
            Some(key) => key,
            None => return None,
        };

        debug!("Getting details for place ID '{}'", place_id);

        let url = format!("{}/maps/api/place/details/json", self.base_url);
        let response = match self
            .client
            .get(&url)
            .query(&[("place_id", place_id), ("fields", DETAILS_FIELDS), ("key", api_key)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Error getting details for place ID {}: {}", place_id, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Place details returned status {}", response.status());
            return None;
        }

        match response.json::<DetailsResponse>().await {
            Ok(data) => data.result,
            Err(e) => {
                error!("Malformed details payload for place ID {}: {}", place_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> PlacesConfig {
        PlacesConfig {
            base_url,
            ..PlacesConfig::default()
        }
    }

    #[tokio::test]
    async fn search_returns_the_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .and(query_param("query", "Balthazar"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"place_id": "abc123", "name": "Balthazar", "formatted_address": "80 Spring St"},
                    {"place_id": "other", "name": "Balthazar Bakery", "formatted_address": "elsewhere"}
                ],
                "status": "OK"
            })))
            .mount(&server)
            .await;

        let client = PlacesClient::new(&test_config(server.uri()), Some("test-key".to_string()));
        let summary = client.search_venue("Balthazar").await.unwrap().unwrap();

        assert_eq!(summary.place_id.as_deref(), Some("abc123"));
        assert_eq!(summary.name, "Balthazar");
    }

    #[tokio::test]
    async fn search_with_no_results_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [],
                "status": "ZERO_RESULTS"
            })))
            .mount(&server)
            .await;

        let client = PlacesClient::new(&test_config(server.uri()), Some("test-key".to_string()));
        let summary = client.search_venue("Nowhere Cafe").await.unwrap();

        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn search_without_api_key_is_an_error() {
        let client = PlacesClient::new(&test_config("http://unused.example".to_string()), None);
        assert!(!client.has_api_key());
        assert!(client.search_venue("Balthazar").await.is_err());
    }

    #[tokio::test]
    async fn search_maps_upstream_failure_to_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PlacesClient::new(&test_config(server.uri()), Some("test-key".to_string()));
        let summary = client.search_venue("Balthazar").await.unwrap();

        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn details_parses_the_full_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .and(query_param("place_id", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "name": "Balthazar",
                    "formatted_address": "80 Spring St, New York, NY 10012",
                    "price_level": 3,
                    "types": ["restaurant", "food"],
                    "website": "https://balthazarny.com",
                    "formatted_phone_number": "(212) 965-1414",
                    "rating": 4.4,
                    "user_ratings_total": 7000,
                    "opening_hours": {"weekday_text": ["Monday: 8AM-11PM", "Tuesday: 8AM-11PM"]},
                    "reviews": [
                        {"author_name": "Ana", "text": "Great bread", "rating": 5.0}
                    ]
                },
                "status": "OK"
            })))
            .mount(&server)
            .await;

        let client = PlacesClient::new(&test_config(server.uri()), Some("test-key".to_string()));
        let details = client.place_details("abc123").await.unwrap();

        assert_eq!(details.name, "Balthazar");
        assert_eq!(details.website, "https://balthazarny.com");
        assert_eq!(details.price_level, Some(3));
        assert_eq!(
            details.opening_hours_joined(),
            "Monday: 8AM-11PM, Tuesday: 8AM-11PM"
        );
        assert_eq!(details.reviews.len(), 1);
    }

    #[tokio::test]
    async fn details_failure_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PlacesClient::new(&test_config(server.uri()), Some("test-key".to_string()));
        assert!(client.place_details("abc123").await.is_none());

        let keyless = PlacesClient::new(&test_config(server.uri()), None);
        assert!(keyless.place_details("abc123").await.is_none());
    }
}
