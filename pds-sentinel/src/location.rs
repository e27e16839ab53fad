use pds_utils::geo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default buffer radius around the site, one Sentinel-2 10 m pixel.
pub const DEFAULT_BUFFER_METERS: f64 = 10.0;

/// Number of vertices used to approximate the buffer circle.
pub const RING_VERTICES: usize = 32;

/// A resolved position for the panel site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees (WGS84)
    pub latitude: f64,
    /// Longitude in decimal degrees (WGS84)
    pub longitude: f64,
    /// Display name returned by the geocoder, if any
    pub label: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if known, otherwise "lat, lon".
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{:.5}, {:.5}", self.latitude, self.longitude),
        }
    }

    /// GeoJSON Point geometry. Coordinates are `[lon, lat]`.
    pub fn to_geojson_point(&self) -> Value {
        json!({
            "type": "Point",
            "coordinates": [self.longitude, self.latitude],
        })
    }
}

/// The site and the radius around it over which the index is averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub center: Location,
    pub buffer_meters: f64,
}

impl AreaOfInterest {
    pub fn new(center: Location, buffer_meters: f64) -> Self {
        AreaOfInterest {
            center,
            buffer_meters,
        }
    }

    /// Closed ring of `(lon, lat)` pairs approximating the buffer circle.
    /// The first vertex is repeated at the end.
    pub fn ring(&self) -> Vec<(f64, f64)> {
        let mut ring: Vec<(f64, f64)> = (0..RING_VERTICES)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / RING_VERTICES as f64;
                let (lat, lon) = geo::offset(
                    self.center.latitude,
                    self.center.longitude,
                    self.buffer_meters * theta.cos(),
                    self.buffer_meters * theta.sin(),
                );
                (lon, lat)
            })
            .collect();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        ring
    }

    /// GeoJSON Polygon geometry of the buffer.
    pub fn to_geojson_polygon(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self.ring().into_iter().map(|(x, y)| [x, y]).collect();
        json!({
            "type": "Polygon",
            "coordinates": [coordinates],
        })
    }
}
