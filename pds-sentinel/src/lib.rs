//! Inputs for panel dust surveys: NDVI samples, date windows, site
//! locations, and the clients that produce them.
//!
//! The network clients (`geocode`, `statistics`) are behind the `api`
//! feature so the core types stay usable without an HTTP stack.

pub mod error;
pub mod location;
pub mod sample;
pub mod source;
pub mod window;

#[cfg(feature = "api")]
pub mod geocode;
#[cfg(feature = "api")]
pub mod statistics;

pub use error::{Result, SentinelError};
pub use location::{AreaOfInterest, Location};
pub use sample::Sample;
pub use source::{CsvSampleSource, SampleRequest, SampleSource};
pub use window::DateWindow;
