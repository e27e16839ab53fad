use crate::config::AppConfig;
use pds_sentinel::geocode::NominatimGeocoder;
use std::path::Path;

/// Resolve an address and print `lat,lon,label`.
pub async fn run_geocode(address: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let geocoder = NominatimGeocoder::new(crate::analyze::http_client()?, config.geocoder);
    let location = geocoder.geocode(address).await?;
    println!(
        "{:.7},{:.7},{}",
        location.latitude,
        location.longitude,
        location.label.unwrap_or_default()
    );
    Ok(())
}
