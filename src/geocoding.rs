// src/geocoding.rs

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{normalize_base_url, GeocoderConfig};
use crate::coordinate::Coordinate;
use crate::error::MapError;

pub type GeocodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<SearchResult>, MapError>> + Send + 'a>>;

/// The first match returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
    /// The provider's object, untouched.
    pub raw: Value,
}

/// A provider that resolves a free-text query to its best match.
pub trait Geocoder: Send + Sync {
    /// Forward geocode `query`. `Ok(None)` means the provider found nothing.
    fn search(&self, query: String) -> GeocodeFuture<'_>;
}

// Only the fields we read; anything else stays in `SearchResult::raw`.
#[derive(Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Parses a geocoding response body and returns its first candidate.
///
/// The body must be a JSON array. Only the first element is inspected: its
/// `lat` and `lon` string fields are parsed as decimal degrees and must form a
/// valid [`Coordinate`]. An empty array yields `Ok(None)`.
pub fn parse_first_match(body: &[u8]) -> Result<Option<SearchResult>, MapError> {
    let candidates: Vec<Value> = serde_json::from_slice(body).map_err(|e| {
        MapError::JsonDeserializationFailed(format!(
            "expected a JSON array of candidates: {}. Body: {}",
            e,
            String::from_utf8_lossy(body)
        ))
    })?;

    let Some(first) = candidates.into_iter().next() else {
        return Ok(None);
    };

    let candidate: Candidate = serde_json::from_value(first.clone()).map_err(|e| {
        MapError::JsonDeserializationFailed(format!("first candidate is malformed: {}", e))
    })?;
    let latitude = candidate.lat.trim().parse::<f64>().map_err(|e| {
        MapError::JsonDeserializationFailed(format!("invalid lat {:?}: {}", candidate.lat, e))
    })?;
    let longitude = candidate.lon.trim().parse::<f64>().map_err(|e| {
        MapError::JsonDeserializationFailed(format!("invalid lon {:?}: {}", candidate.lon, e))
    })?;
    let coordinate = Coordinate::new(latitude, longitude).map_err(|e| {
        MapError::JsonDeserializationFailed(format!("first candidate is out of range: {}", e))
    })?;

    Ok(Some(SearchResult {
        coordinate,
        display_name: candidate.display_name,
        raw: first,
    }))
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: Url,
    http_client: Client,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, MapError> {
        let base_url = normalize_base_url(&config.base_url)?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(MapError::ReqwestError)?;

        log::debug!("Geocoder initialized with base url: {}", base_url);

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Builds `{base}/search?format=json&q=<query>`, form-encoding the query.
    pub fn search_url(&self, query: &str) -> Result<Url, MapError> {
        let mut url = self.base_url.join("search").map_err(|e| {
            MapError::InvalidUrl(format!(
                "Failed to join base URL '{}' with 'search': {}",
                self.base_url, e
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query);
        Ok(url)
    }

    async fn forward_geocode(&self, query: String) -> Result<Option<SearchResult>, MapError> {
        let url = self.search_url(&query)?;
        log::debug!("Geocoding request: GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(MapError::ReqwestError)?;

        let status = response.status();
        let body = response.bytes().await.map_err(MapError::ReqwestError)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            log::warn!(
                "Geocoding request failed with status {}. Response body: {}",
                status,
                body
            );
            return Err(MapError::GeocodingStatus {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!(
            "Geocoding response ({}): {}",
            status,
            String::from_utf8_lossy(&body)
        );
        parse_first_match(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: String) -> GeocodeFuture<'_> {
        Box::pin(self.forward_geocode(query))
    }
}
