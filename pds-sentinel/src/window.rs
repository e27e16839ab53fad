use crate::error::{Result, SentinelError};
use chrono::NaiveDate;

/// An inclusive calendar window `[start, end]` for which samples are requested.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SentinelError::InvalidWindow { start, end });
        }
        Ok(DateWindow { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True if `date` falls inside the window (both ends inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
