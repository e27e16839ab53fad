use crate::soiling::soiling_percent;
use chrono::NaiveDate;
use pds_sentinel::Sample;
use serde::Serialize;
use thiserror::Error;

/// No sample carried a usable index value, so there is nothing to assess.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no usable samples: {total} samples, none with an index value")]
pub struct NoUsableSamples {
    pub total: usize,
}

/// One dated soiling estimate, with the index value it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilingPoint {
    pub date: NaiveDate,
    pub index_value: f64,
    pub soiling_percent: f64,
}

/// Date-ordered soiling estimates for one site. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilingSeries {
    points: Vec<SoilingPoint>,
}

impl SoilingSeries {
    /// Normalize every sample that has a usable value and sort by date.
    ///
    /// Samples with an absent or non-finite index are dropped. Samples on the
    /// same date keep their input order.
    pub fn from_samples(samples: &[Sample]) -> Result<Self, NoUsableSamples> {
        let mut points: Vec<SoilingPoint> = samples
            .iter()
            .filter_map(|s| {
                s.usable_value().map(|index_value| SoilingPoint {
                    date: s.date,
                    index_value,
                    soiling_percent: soiling_percent(index_value),
                })
            })
            .collect();
        if points.is_empty() {
            return Err(NoUsableSamples {
                total: samples.len(),
            });
        }
        points.sort_by_key(|p| p.date);
        Ok(SoilingSeries { points })
    }

    pub fn points(&self) -> &[SoilingPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SoilingPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &SoilingPoint {
        &self.points[0]
    }

    pub fn latest(&self) -> &SoilingPoint {
        &self.points[self.points.len() - 1]
    }

    /// The point with the highest soiling percentage (earliest on ties).
    pub fn peak(&self) -> &SoilingPoint {
        self.points
            .iter()
            .fold(&self.points[0], |best, p| {
                if p.soiling_percent > best.soiling_percent {
                    p
                } else {
                    best
                }
            })
    }

    pub fn mean_percent(&self) -> f64 {
        self.points.iter().map(|p| p.soiling_percent).sum::<f64>() / self.points.len() as f64
    }
}

impl<'a> IntoIterator for &'a SoilingSeries {
    type Item = &'a SoilingPoint;
    type IntoIter = std::slice::Iter<'a, SoilingPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, d).unwrap()
    }

    #[test]
    fn test_from_samples_drops_absent_and_sorts() {
        let samples = vec![
            Sample::new(day(20), Some(0.5)),
            Sample::new(day(5), None),
            Sample::new(day(10), Some(0.7)),
            Sample::new(day(15), Some(f64::NAN)),
        ];
        let series = SoilingSeries::from_samples(&samples).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().date, day(10));
        assert_eq!(series.first().soiling_percent, 0.0);
        assert_eq!(series.latest().date, day(20));
        assert!((series.latest().soiling_percent - 50.0).abs() < 1e-9);
        assert!((series.latest().index_value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_samples_all_absent() {
        let samples = vec![Sample::new(day(1), None), Sample::new(day(2), None)];
        let err = SoilingSeries::from_samples(&samples).unwrap_err();
        assert_eq!(err, NoUsableSamples { total: 2 });
    }

    #[test]
    fn test_from_samples_empty() {
        let err = SoilingSeries::from_samples(&[]).unwrap_err();
        assert_eq!(err.total, 0);
    }

    #[test]
    fn test_statistics() {
        let samples = vec![
            Sample::new(day(1), Some(0.6)),  // 25 %
            Sample::new(day(2), Some(0.4)),  // 75 %
            Sample::new(day(3), Some(0.4)),  // 75 %
            Sample::new(day(4), Some(0.65)), // 12.5 %
        ];
        let series = SoilingSeries::from_samples(&samples).unwrap();
        assert_eq!(series.peak().date, day(2));
        assert!((series.mean_percent() - 46.875).abs() < 1e-9);
        assert_eq!(series.iter().count(), 4);
    }
}
