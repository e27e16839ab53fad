//! Runtime configuration: an optional TOML file plus secrets from the
//! environment.
//!
//! ```toml
//! [geocoder]
//! user_agent = "my-solar-farm"
//!
//! [sentinel_hub]
//! client_id = "sh-..."
//!
//! [analysis]
//! cloud_ceiling = 20.0
//! buffer_meters = 10.0
//! policy = "maximum"
//!
//! [smtp]
//! relay = "smtp-relay.brevo.com"
//! sender = "Panel Watch <alerts@example.com>"
//! recipients = ["ops@example.com"]
//! ```
//!
//! # Environment Variables
//! - `PDS_SH_CLIENT_ID` / `PDS_SH_CLIENT_SECRET`: Sentinel Hub OAuth client
//! - `PDS_SMTP_USERNAME` / `PDS_SMTP_PASSWORD`: SMTP relay credentials
//!
//! Environment values win over the file.

use anyhow::Context;
use pds_data::alert::ClassificationPolicy;
use pds_notify::smtp::SmtpConfig;
use pds_sentinel::geocode::GeocoderConfig;
use pds_sentinel::location::DEFAULT_BUFFER_METERS;
use pds_sentinel::source::DEFAULT_CLOUD_CEILING;
use pds_sentinel::statistics::SentinelHubConfig;
use serde::Deserialize;
use std::path::Path;

pub const ENV_SH_CLIENT_ID: &str = "PDS_SH_CLIENT_ID";
pub const ENV_SH_CLIENT_SECRET: &str = "PDS_SH_CLIENT_SECRET";
pub const ENV_SMTP_USERNAME: &str = "PDS_SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "PDS_SMTP_PASSWORD";

/// Defaults for the analysis; command line flags override these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cloud_ceiling: f64,
    pub buffer_meters: f64,
    pub policy: ClassificationPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            cloud_ceiling: DEFAULT_CLOUD_CEILING,
            buffer_meters: DEFAULT_BUFFER_METERS,
            policy: ClassificationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub geocoder: GeocoderConfig,
    pub sentinel_hub: SentinelHubConfig,
    pub analysis: AnalysisConfig,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read the file if given, fall back to defaults otherwise, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let body = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml_str(&body)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => AppConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay secrets from a key lookup (the process environment in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_SH_CLIENT_ID) {
            self.sentinel_hub.client_id = v;
        }
        if let Some(v) = lookup(ENV_SH_CLIENT_SECRET) {
            self.sentinel_hub.client_secret = v;
        }
        if let Some(v) = lookup(ENV_SMTP_USERNAME) {
            self.smtp.username = v;
        }
        if let Some(v) = lookup(ENV_SMTP_PASSWORD) {
            self.smtp.password = v;
        }
    }
}
