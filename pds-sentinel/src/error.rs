/// Error types for the sentinel input library
use thiserror::Error;

/// Main error type for geocoding and sample retrieval
#[derive(Error, Debug)]
pub enum SentinelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    /// Remote service answered with a non-success status
    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse HTTP response
    #[error("Failed to parse HTTP response: {0}")]
    ResponseParse(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read a local file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Start date lies after end date
    #[error("Invalid date window: {start} is after {end}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Geocoder returned no match
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Token request rejected or credentials missing
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for SentinelError {
    fn from(e: serde_json::Error) -> Self {
        SentinelError::ResponseParse(e.to_string())
    }
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for SentinelError {
    fn from(e: reqwest::Error) -> Self {
        SentinelError::HttpRequest(e.to_string())
    }
}

/// Type alias for Results using SentinelError
pub type Result<T> = std::result::Result<T, SentinelError>;
