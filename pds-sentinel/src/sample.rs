use crate::error::{Result, SentinelError};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;

/// Date format used in sample CSV files: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One cloud-filtered satellite pass over the site.
///
/// `index_value` is the NDVI averaged over the area of interest, or `None`
/// when the pass produced no valid pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub index_value: Option<f64>,
}

impl Sample {
    pub fn new(date: NaiveDate, index_value: Option<f64>) -> Self {
        Sample { date, index_value }
    }

    /// The index value if present and finite. NaN and infinities count as absent.
    pub fn usable_value(&self) -> Option<f64> {
        self.index_value.filter(|v| v.is_finite())
    }

    /// Parse a `date,ndvi` CSV body (header row required) into samples.
    ///
    /// Empty cells and `NaN` are absent values; a malformed date or a
    /// non-numeric value is an error.
    ///
    /// ```text
    /// date,ndvi
    /// 2023-06-02,0.41
    /// 2023-06-07,
    /// ```
    pub fn parse_samples_csv(csv_object: &str) -> Result<Vec<Sample>> {
        let mut samples: Vec<Sample> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let date_str = record.get(0).unwrap_or("");
            if date_str.is_empty() {
                continue;
            }
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| SentinelError::DateParse(format!("{}: {}", date_str, e)))?;
            let index_value = match record.get(1).unwrap_or("") {
                "" => None,
                s if s.eq_ignore_ascii_case("nan") => None,
                s => Some(s.parse::<f64>().map_err(|_| {
                    SentinelError::InvalidFormat(format!("ndvi value '{}' on {}", s, date_str))
                })?),
            };
            samples.push(Sample { date, index_value });
        }
        Ok(samples)
    }
}
