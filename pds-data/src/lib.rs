//! Soiling estimation for solar panel sites.
//!
//! This crate turns NDVI samples into a bounded soiling percentage and
//! decides whether a site needs cleaning.

pub mod alert;
pub mod series;

/// Linear mapping from a vegetation index to a soiling percentage.
pub mod soiling {
    /// Index value of a clean panel surface; maps to 0 %.
    pub const CLEAN_PANEL_INDEX: f64 = 0.7;

    /// Index drop below the clean baseline that maps to 100 %.
    /// An index at or below `CLEAN_PANEL_INDEX - FULL_SOILING_SPAN` (0.3) is fully soiled.
    pub const FULL_SOILING_SPAN: f64 = 0.4;

    /// Convert an index value to a soiling estimate in `[0, 100]`.
    ///
    /// `clamp((0.7 - index) / 0.4 * 100, 0, 100)`. Lower index, dustier panel.
    /// Callers filter out absent and non-finite values first.
    pub fn soiling_percent(index_value: f64) -> f64 {
        ((CLEAN_PANEL_INDEX - index_value) / FULL_SOILING_SPAN * 100.0).clamp(0.0, 100.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use proptest::prelude::*;

        fn close(a: f64, b: f64) -> bool {
            (a - b).abs() < 1e-9
        }

        #[test]
        fn test_reference_points() {
            assert!(close(soiling_percent(0.7), 0.0));
            assert!(close(soiling_percent(0.3), 100.0));
            assert!(close(soiling_percent(0.5), 50.0));
        }

        #[test]
        fn test_clamped_at_both_ends() {
            assert_eq!(soiling_percent(1.0), 0.0);
            assert_eq!(soiling_percent(-1.0), 100.0);
        }

        #[test]
        fn test_same_input_same_output() {
            let first = soiling_percent(0.42);
            let second = soiling_percent(0.42);
            assert_eq!(first.to_bits(), second.to_bits());
        }

        proptest! {
            #[test]
            fn bounded_over_index_range(index in -1.0f64..=1.0) {
                let percent = soiling_percent(index);
                prop_assert!((0.0..=100.0).contains(&percent));
            }

            #[test]
            fn lower_index_is_never_cleaner(a in -1.0f64..=1.0, b in -1.0f64..=1.0) {
                let (low, high) = if a < b { (a, b) } else { (b, a) };
                prop_assert!(soiling_percent(low) >= soiling_percent(high));
            }
        }
    }
}
