//! NDVI to soiling conversion for quick checks from the shell.

use pds_data::alert::{state_for, PanelState};
use pds_data::soiling::soiling_percent;

/// One output line per value: `ndvi<TAB>soiling%<TAB>flag`.
pub fn format_soiling_line(index_value: f64) -> String {
    if !index_value.is_finite() {
        return format!("{}\t-\tno data", index_value);
    }
    let percent = soiling_percent(index_value);
    let flag = match state_for(percent) {
        PanelState::Dusty => "dusty",
        PanelState::Clean => "clean",
    };
    format!("{:.4}\t{:.1}\t{}", index_value, percent, flag)
}

pub fn run_soiling(values: &[f64]) {
    for value in values {
        println!("{}", format_soiling_line(*value));
    }
}

#[cfg(test)]
mod tests {
    use super::format_soiling_line;

    #[test]
    fn test_format_soiling_line() {
        assert_eq!(format_soiling_line(0.7), "0.7000\t0.0\tclean");
        assert_eq!(format_soiling_line(0.5), "0.5000\t50.0\tdusty");
        assert_eq!(format_soiling_line(-1.0), "-1.0000\t100.0\tdusty");
        assert_eq!(format_soiling_line(f64::NAN), "NaN\t-\tno data");
    }
}
