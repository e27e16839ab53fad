//! Sentinel-2 NDVI time series from the Sentinel Hub Statistical API
//! (Copernicus Data Space Ecosystem).
//!
//! The service does the cloud filtering and spatial averaging; this client
//! only composes the request and reads back one mean NDVI per acquisition day.
//!
//! See: <https://documentation.dataspace.copernicus.eu/APIs/SentinelHub/Statistical.html>

use crate::error::{Result, SentinelError};
use crate::sample::Sample;
use crate::source::{SampleRequest, SampleSource};
use async_trait::async_trait;
use log::{debug, info, warn};
use pds_utils::dates;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const CDSE_TOKEN_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";
pub const CDSE_STATISTICS_URL: &str = "https://sh.dataspace.copernicus.eu/api/v1/statistics";

/// Sentinel-2 level 2A (surface reflectance) collection.
pub const SENTINEL_2_L2A: &str = "sentinel-2-l2a";

/// Roughly 10 m in degrees, the native B04/B08 resolution.
pub const DEFAULT_RESOLUTION_DEGREES: f64 = 0.0001;

/// Tokens are refreshed this long before the advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// NDVI = (B08 - B04) / (B08 + B04), masked by dataMask.
pub const NDVI_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: [{ bands: ["B04", "B08", "dataMask"] }],
    output: [
      { id: "ndvi", bands: 1, sampleType: "FLOAT32" },
      { id: "dataMask", bands: 1 }
    ]
  };
}

function evaluatePixel(samples) {
  let ndvi = (samples.B08 - samples.B04) / (samples.B08 + samples.B04);
  return { ndvi: [ndvi], dataMask: [samples.dataMask] };
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelHubConfig {
    pub token_url: String,
    pub statistics_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub collection: String,
    pub resolution_degrees: f64,
    pub timeout_secs: u64,
}

impl Default for SentinelHubConfig {
    fn default() -> Self {
        SentinelHubConfig {
            token_url: CDSE_TOKEN_URL.to_string(),
            statistics_url: CDSE_STATISTICS_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            collection: SENTINEL_2_L2A.to_string(),
            resolution_degrees: DEFAULT_RESOLUTION_DEGREES,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Build the Statistical API request body for a sample request.
pub fn build_request_body(request: &SampleRequest, config: &SentinelHubConfig) -> Value {
    json!({
        "input": {
            "bounds": {
                "geometry": request.area.to_geojson_polygon(),
                "properties": { "crs": "http://www.opengis.net/def/crs/OGC/1.3/CRS84" }
            },
            "data": [{
                "type": config.collection,
                "dataFilter": { "maxCloudCoverage": request.cloud_ceiling }
            }]
        },
        "aggregation": {
            "timeRange": {
                "from": dates::start_of_day_utc(&request.window.start()),
                "to": dates::end_of_day_utc(&request.window.end())
            },
            "aggregationInterval": { "of": "P1D" },
            "evalscript": NDVI_EVALSCRIPT,
            "resx": config.resolution_degrees,
            "resy": config.resolution_degrees
        },
        "calculations": { "default": {} }
    })
}

/// Read the per-day NDVI means out of a Statistical API response.
///
/// Intervals whose `mean` is missing, `"NaN"` or not a number become absent
/// samples. Intervals the service flags with an `error` are skipped.
pub fn parse_statistics_response(body: &str) -> Result<Vec<Sample>> {
    let root: Value = serde_json::from_str(body)?;
    let intervals = root
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| SentinelError::ResponseParse("missing 'data' array".to_string()))?;

    let mut samples = Vec::with_capacity(intervals.len());
    for interval in intervals {
        let from = interval
            .pointer("/interval/from")
            .and_then(Value::as_str)
            .ok_or_else(|| SentinelError::ResponseParse("interval without 'from'".to_string()))?;
        let date = dates::parse_timestamp_date(from)
            .map_err(|e| SentinelError::DateParse(format!("{}: {}", from, e)))?;

        if let Some(error) = interval.get("error") {
            warn!("Skipping {}: service reported {}", date, error);
            continue;
        }

        let index_value = interval
            .pointer("/outputs/ndvi/bands/B0/stats/mean")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite());
        samples.push(Sample { date, index_value });
    }
    Ok(samples)
}

/// Client handle for the Statistical API.
///
/// Construct once per process and pass by reference; the handle keeps the
/// HTTP connection pool and the bearer token between requests.
pub struct SentinelHubClient {
    client: Client,
    config: SentinelHubConfig,
    token: Mutex<Option<AccessToken>>,
}

impl SentinelHubClient {
    pub fn new(client: Client, config: SentinelHubConfig) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(SentinelError::Authentication(
                "Sentinel Hub client id and secret are required".to_string(),
            ));
        }
        Ok(SentinelHubClient {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// A valid bearer token, requesting a new one when the cached one is stale.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting access token from {}", self.config.token_url);
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelError::Authentication(format!("{}: {}", status, body)));
        }
        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = token.access_token;
        *cached = Some(AccessToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(value)
    }
}

#[async_trait]
impl SampleSource for SentinelHubClient {
    async fn fetch_samples(&self, request: &SampleRequest) -> Result<Vec<Sample>> {
        let token = self.access_token().await?;
        let body = build_request_body(request, &self.config);

        info!(
            "Requesting NDVI statistics around {} from {} to {} (cloud cover <= {}%)",
            request.area.center.display_name(),
            request.window.start(),
            request.window.end(),
            request.cloud_ceiling
        );

        let response = self
            .client
            .post(&self.config.statistics_url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SentinelError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let samples = parse_statistics_response(&text)?;
        info!("  {} acquisitions returned", samples.len());
        Ok(samples)
    }
}
