use anyhow::Context;
use pds_data::alert::AlertDecision;
use pds_data::series::SoilingSeries;
use pds_sentinel::AreaOfInterest;
use pds_utils::dates::format_date;
use serde_json::{json, Value};
use std::path::Path;

/// GeoJSON FeatureCollection with the site point and its buffer polygon.
///
/// The verdict, when there is one, is attached to the point's properties so
/// a map viewer can color the site.
pub fn site_feature_collection(
    area: &AreaOfInterest,
    series: Option<&SoilingSeries>,
    decision: Option<&AlertDecision>,
) -> Value {
    let mut site_properties = json!({
        "name": area.center.display_name(),
        "role": "site",
    });
    if let Some(decision) = decision {
        site_properties["state"] = json!(decision.state.to_string());
        site_properties["soiling_percent"] = json!((decision.soiling_percent * 10.0).round() / 10.0);
    }
    if let Some(series) = series {
        site_properties["samples"] = json!(series.len());
        site_properties["latest_date"] = json!(format_date(&series.latest().date));
    }

    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": area.center.to_geojson_point(),
                "properties": site_properties,
            },
            {
                "type": "Feature",
                "geometry": area.to_geojson_polygon(),
                "properties": {
                    "role": "buffer",
                    "buffer_meters": area.buffer_meters,
                },
            }
        ]
    })
}

pub fn write_geojson_file<P: AsRef<Path>>(path: P, collection: &Value) -> anyhow::Result<()> {
    let path = path.as_ref();
    let body = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, body).with_context(|| format!("writing GeoJSON {}", path.display()))?;
    log::info!("Wrote site map to {}", path.display());
    Ok(())
}
