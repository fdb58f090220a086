//! HTTP client for a Nominatim-compatible geocoding provider.
//!
//! Forward lookups (search, suggestions) degrade silently: any provider
//! error, non-success status, or malformed body yields an empty result
//! list and a log line, never a user-facing failure. Reverse lookups
//! degrade to the `"Unknown location"` fallback string.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use loci_core::defaults::{ENV_GEOCODER_BASE_URL, ENV_GEOCODER_TIMEOUT_SECS};
use loci_core::{Coordinates, Error, Result, SearchResult, SearchSuggestion};

/// Default geocoder endpoint.
pub const DEFAULT_GEOCODER_URL: &str = loci_core::defaults::GEOCODER_URL;

/// Timeout for geocoder requests (seconds).
pub const GEOCODER_TIMEOUT_SECS: u64 = loci_core::defaults::GEOCODER_TIMEOUT_SECS;

/// Result limit for explicit full searches.
pub const SEARCH_LIMIT: usize = loci_core::defaults::SEARCH_LIMIT;

/// Result limit for typeahead suggestions.
pub const SUGGESTION_LIMIT: usize = loci_core::defaults::SUGGESTION_LIMIT;

/// Fallback label when reverse geocoding yields nothing usable.
pub const UNKNOWN_LOCATION: &str = loci_core::defaults::UNKNOWN_LOCATION;

/// Nominatim-style geocoder client.
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    /// Create a client against the default provider.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_GEOCODER_URL.to_string())
    }

    /// Create a client against a custom provider base URL.
    pub fn with_config(base_url: String) -> Self {
        let timeout_secs = std::env::var(ENV_GEOCODER_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEOCODER_TIMEOUT_SECS);

        // Nominatim usage policy requires an identifying User-Agent.
        let client = Client::builder()
            .user_agent(format!("loci/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            base_url = %base_url,
            timeout_secs,
            "Initializing geocode client"
        );

        Self { client, base_url }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_GEOCODER_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string());
        Self::with_config(base_url)
    }

    /// Full location search, ranked by the provider.
    ///
    /// Blank queries return an empty list without a network call.
    #[instrument(skip(self), fields(subsystem = "geocode", component = "client", op = "search", query = %query))]
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let places = match self.fetch_places(query, SEARCH_LIMIT, true).await {
            Ok(places) => places,
            Err(e) => {
                warn!(error = %e, "Geocoder search failed, returning no results");
                return Vec::new();
            }
        };

        let results: Vec<SearchResult> = places
            .into_iter()
            .enumerate()
            .filter_map(|(index, place)| place.into_result(index))
            .collect();

        debug!(
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        results
    }

    /// Typeahead suggestions for a partial query.
    ///
    /// Blank queries return an empty list without a network call.
    #[instrument(skip(self), fields(subsystem = "geocode", component = "client", op = "suggest", query = %query))]
    pub async fn suggestions(&self, query: &str) -> Vec<SearchSuggestion> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let places = match self.fetch_places(query, SUGGESTION_LIMIT, false).await {
            Ok(places) => places,
            Err(e) => {
                debug!(error = %e, "Geocoder suggestions failed, returning none");
                return Vec::new();
            }
        };

        places
            .into_iter()
            .enumerate()
            .map(|(index, place)| place.into_suggestion(index))
            .collect()
    }

    /// Reverse geocode a position into a human-readable place name.
    ///
    /// Never fails: any provider error or missing field yields the
    /// `"Unknown location"` fallback.
    #[instrument(skip(self), fields(subsystem = "geocode", component = "client", op = "reverse"))]
    pub async fn reverse(&self, position: Coordinates) -> String {
        match self.fetch_reverse(position).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    async fn fetch_places(
        &self,
        query: &str,
        limit: usize,
        address_details: bool,
    ) -> Result<Vec<RawPlace>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", limit.as_str()),
                ("addressdetails", if address_details { "1" } else { "0" }),
            ])
            .send()
            .await
            .map_err(|e| Error::Request(format!("Geocoder request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SearchProvider(format!(
                "Geocoder returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<RawPlace>>()
            .await
            .map_err(|e| Error::SearchProvider(format!("Malformed geocoder response: {}", e)))
    }

    async fn fetch_reverse(&self, position: Coordinates) -> Result<Option<String>> {
        let lat = position.latitude.to_string();
        let lon = position.longitude.to_string();
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("addressdetails", "0"),
            ])
            .send()
            .await
            .map_err(|e| Error::Request(format!("Reverse geocode request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SearchProvider(format!(
                "Geocoder returned {}",
                response.status()
            )));
        }

        let body: RawReverse = response
            .json()
            .await
            .map_err(|e| Error::SearchProvider(format!("Malformed geocoder response: {}", e)))?;

        Ok(body.display_name.filter(|name| !name.is_empty()))
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the provider's `/search` response.
#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: Option<u64>,
    name: Option<String>,
    display_name: String,
    lat: Option<String>,
    lon: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    importance: Option<f64>,
}

/// Response body of the provider's `/reverse` endpoint.
#[derive(Debug, Deserialize)]
struct RawReverse {
    display_name: Option<String>,
}

impl RawPlace {
    /// Display label: the provider's `name`, or the first segment of
    /// `display_name` when absent.
    fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .display_name
                .split(',')
                .next()
                .unwrap_or("")
                .to_string(),
        }
    }

    fn id(&self, index: usize) -> String {
        match self.place_id {
            Some(place_id) => place_id.to_string(),
            None => index.to_string(),
        }
    }

    fn kind(&self) -> String {
        match &self.kind {
            Some(kind) if !kind.is_empty() => kind.clone(),
            _ => "unknown".to_string(),
        }
    }

    /// Convert into a full result; entries with missing or unparsable
    /// coordinates are dropped.
    fn into_result(self, index: usize) -> Option<SearchResult> {
        let latitude = parse_coordinate(self.lat.as_deref());
        let longitude = parse_coordinate(self.lon.as_deref());
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            debug!(
                display_name = %self.display_name,
                "Skipping result with unparsable coordinates"
            );
            return None;
        };

        // Derive the borrowed fields before display_name is moved out.
        let id = self.id(index);
        let name = self.label();
        let kind = self.kind();
        Some(SearchResult {
            id,
            name,
            display_name: self.display_name,
            latitude,
            longitude,
            kind,
            importance: self.importance.unwrap_or(0.0),
        })
    }

    fn into_suggestion(self, index: usize) -> SearchSuggestion {
        let id = self.id(index);
        let name = self.label();
        let kind = self.kind();
        SearchSuggestion {
            id,
            name,
            display_name: self.display_name,
            kind,
        }
    }
}

/// Coordinates arrive as JSON strings; reject non-finite values too.
fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// ==========================================================================
// Tests
// ==========================================================================
