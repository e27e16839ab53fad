//! Shared utility functions for PDS crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse the calendar date out of an RFC 3339 timestamp
    /// (e.g. "2023-06-02T00:00:00Z" -> 2023-06-02).
    ///
    /// Only the leading "YYYY-MM-DD" is read; the time and offset are ignored,
    /// which matches how the statistics service reports daily intervals in UTC.
    pub fn parse_timestamp_date(s: &str) -> anyhow::Result<NaiveDate> {
        let day = s.trim().get(..10).unwrap_or(s);
        parse_date(day)
    }

    /// First instant of the day in UTC, RFC 3339 ("YYYY-MM-DDT00:00:00Z")
    pub fn start_of_day_utc(date: &NaiveDate) -> String {
        format!("{}T00:00:00Z", format_date(date))
    }

    /// Last second of the day in UTC, RFC 3339 ("YYYY-MM-DDT23:59:59Z")
    pub fn end_of_day_utc(date: &NaiveDate) -> String {
        format!("{}T23:59:59Z", format_date(date))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_rejects_compact_format() {
            assert!(parse_date("20230615").is_err());
        }

        #[test]
        fn test_parse_timestamp_date() {
            let parsed = parse_timestamp_date("2023-06-02T00:00:00Z").unwrap();
            assert_eq!(parsed, NaiveDate::from_ymd_opt(2023, 6, 2).unwrap());
            assert!(parse_timestamp_date("June 2").is_err());
        }

        #[test]
        fn test_day_bounds() {
            let date = NaiveDate::from_ymd_opt(2023, 8, 31).unwrap();
            assert_eq!(start_of_day_utc(&date), "2023-08-31T00:00:00Z");
            assert_eq!(end_of_day_utc(&date), "2023-08-31T23:59:59Z");
        }
    }
}

/// Geodesy helpers for small areas around a site
pub mod geo {
    /// Mean Earth radius in meters (IUGG)
    pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

    /// Meters spanned by one degree of latitude.
    pub fn meters_per_degree_lat() -> f64 {
        EARTH_RADIUS_M * std::f64::consts::PI / 180.0
    }

    /// Meters spanned by one degree of longitude at the given latitude.
    pub fn meters_per_degree_lon(latitude: f64) -> f64 {
        meters_per_degree_lat() * latitude.to_radians().cos()
    }

    /// Offset a (lat, lon) position by north/east distances in meters.
    ///
    /// Flat-earth approximation, fine for the tens to hundreds of meters a
    /// panel site buffer spans. Not valid near the poles.
    pub fn offset(latitude: f64, longitude: f64, north_m: f64, east_m: f64) -> (f64, f64) {
        let lat = latitude + north_m / meters_per_degree_lat();
        let lon = longitude + east_m / meters_per_degree_lon(latitude);
        (lat, lon)
    }

}
