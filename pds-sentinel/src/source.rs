//! The narrow seam between the dust assessment and whatever provides
//! NDVI samples: a remote statistics service or a local CSV file.

use crate::error::Result;
use crate::location::AreaOfInterest;
use crate::sample::Sample;
use crate::window::DateWindow;
use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;

/// Default cloud-cover ceiling in percent.
pub const DEFAULT_CLOUD_CEILING: f64 = 20.0;

/// What to fetch: where, when, and how cloudy a pass may be.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub area: AreaOfInterest,
    pub window: DateWindow,
    /// Passes with more cloud cover than this percentage are excluded.
    pub cloud_ceiling: f64,
}

/// Anything that can return NDVI samples for a request.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch_samples(&self, request: &SampleRequest) -> Result<Vec<Sample>>;
}

/// Samples read from a `date,ndvi` CSV file.
///
/// The file stands in for a single site, so the requested area is not
/// consulted; only the date window is applied. Cloud filtering is assumed
/// to have happened when the file was produced.
#[derive(Debug, Clone)]
pub struct CsvSampleSource {
    samples: Vec<Sample>,
}

impl CsvSampleSource {
    pub fn from_csv_str(csv_object: &str) -> Result<Self> {
        Ok(CsvSampleSource {
            samples: Sample::parse_samples_csv(csv_object)?,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let body = std::fs::read_to_string(path.as_ref())?;
        let source = Self::from_csv_str(&body)?;
        info!(
            "Loaded {} samples from {}",
            source.samples.len(),
            path.as_ref().display()
        );
        Ok(source)
    }
}

#[async_trait]
impl SampleSource for CsvSampleSource {
    async fn fetch_samples(&self, request: &SampleRequest) -> Result<Vec<Sample>> {
        debug!(
            "CSV source ignores cloud ceiling {}% and area around {}",
            request.cloud_ceiling,
            request.area.center.display_name()
        );
        Ok(self
            .samples
            .iter()
            .filter(|s| request.window.contains(s.date))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Location, DEFAULT_BUFFER_METERS};
    use chrono::NaiveDate;

    const CSV_DATA: &str = "\
date,ndvi
2023-05-28,0.70
2023-06-02,0.41
2023-06-07,
2023-08-31,0.22
2023-09-05,0.65
";

    fn request() -> SampleRequest {
        SampleRequest {
            area: AreaOfInterest::new(Location::new(36.8381, -2.4597), DEFAULT_BUFFER_METERS),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
            )
            .unwrap(),
            cloud_ceiling: DEFAULT_CLOUD_CEILING,
        }
    }

    #[tokio::test]
    async fn test_csv_source_applies_window() {
        let source = CsvSampleSource::from_csv_str(CSV_DATA).unwrap();
        let samples = source.fetch_samples(&request()).await.unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2023, 6, 2).unwrap());
        assert_eq!(samples[1].index_value, None);
        assert_eq!(samples[2].date, NaiveDate::from_ymd_opt(2023, 8, 31).unwrap());
    }

    #[test]
    fn test_csv_source_missing_file() {
        assert!(CsvSampleSource::from_path("does/not/exist.csv").is_err());
    }
}
