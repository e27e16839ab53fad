//! Report outputs for a soiling assessment.
//!
//! - [`table`]: the series as CSV (`date,ndvi,soiling_percent`)
//! - [`chart`]: NDVI and soiling % over time as an SVG line chart
//! - [`map`]: the site and its buffer as a GeoJSON FeatureCollection

pub mod chart;
pub mod map;
pub mod table;
