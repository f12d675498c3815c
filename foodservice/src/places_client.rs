use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

use crate::api::Place;

pub const DEFAULT_PLACES_API_URL: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";

const MAX_PLACES: usize = 5;

/// Client for the Places text-search API used by the locality router.
/// Base URL is injectable so tests can point it at a stub server.
pub struct PlacesClient {
    base_url: String,
    api_key: String,
    client: ClientWithMiddleware,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    name: String,
    place_id: String,
    formatted_address: Option<String>,
    rating: Option<f64>,
}

impl PlacesClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Searches for places serving the dish in the city, at most five results.
    pub async fn nearby_places(&self, dish: &str, city: &str) -> anyhow::Result<Vec<Place>> {
        let query = format!("{} in {}", dish, city);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("query", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to query places API")?;

        if !response.status().is_success() {
            anyhow::bail!("Places API returned {}", response.status());
        }

        let body: TextSearchResponse = response
            .json()
            .await
            .context("Failed to parse places API response")?;

        Ok(body
            .results
            .into_iter()
            .take(MAX_PLACES)
            .map(|result| Place {
                name: result.name,
                address: result
                    .formatted_address
                    .unwrap_or_else(|| "Address not available".to_string()),
                rating: result.rating,
                maps_url: format!(
                    "https://www.google.com/maps/place/?q=place_id:{}",
                    result.place_id
                ),
            })
            .collect())
    }
}
