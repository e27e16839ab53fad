//! Address lookup against the OpenStreetMap Nominatim search API.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use crate::error::{Result, SentinelError};
use crate::location::Location;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Public Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim rejects requests without an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = "panel-dust-survey";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub url: String,
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig {
            url: NOMINATIM_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One entry of a `format=jsonv2` search response. Coordinates come back as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Parse a Nominatim search response body; `Ok(None)` when nothing matched.
pub fn parse_search_response(body: &str) -> Result<Option<Location>> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };
    let latitude = hit
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|_| SentinelError::ResponseParse(format!("latitude '{}'", hit.lat)))?;
    let longitude = hit
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|_| SentinelError::ResponseParse(format!("longitude '{}'", hit.lon)))?;
    Ok(Some(Location {
        latitude,
        longitude,
        label: hit.display_name,
    }))
}

/// Geocoder handle. Create once and reuse; it owns the HTTP connection pool.
pub struct NominatimGeocoder {
    client: Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    pub fn new(client: Client, config: GeocoderConfig) -> Self {
        NominatimGeocoder { client, config }
    }

    /// Resolve a free-text address to the best matching location.
    pub async fn geocode(&self, address: &str) -> Result<Location> {
        debug!("Geocoding '{}' via {}", address, self.config.url);
        let response = self
            .client
            .get(&self.config.url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SentinelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match parse_search_response(&body)? {
            Some(location) => {
                info!(
                    "Resolved '{}' to {:.5}, {:.5}",
                    address, location.latitude, location.longitude
                );
                Ok(location)
            }
            None => Err(SentinelError::AddressNotFound(address.to_string())),
        }
    }
}
