use anyhow::Context;
use pds_data::series::SoilingSeries;
use pds_utils::dates::format_date;
use std::io::Write;
use std::path::Path;

pub const SERIES_HEADERS: [&str; 3] = ["date", "ndvi", "soiling_percent"];

/// Write the series as CSV with a header row.
pub fn write_series_csv<W: Write>(writer: W, series: &SoilingSeries) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SERIES_HEADERS)?;
    for point in series {
        wtr.write_record([
            format_date(&point.date),
            format!("{:.4}", point.index_value),
            format!("{:.1}", point.soiling_percent),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_csv_file<P: AsRef<Path>>(path: P, series: &SoilingSeries) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating series CSV {}", path.display()))?;
    write_series_csv(file, series)?;
    log::info!("Wrote {} rows to {}", series.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pds_sentinel::Sample;

    fn series() -> SoilingSeries {
        let samples = vec![
            Sample::new(NaiveDate::from_ymd_opt(2023, 6, 7).unwrap(), Some(0.25)),
            Sample::new(NaiveDate::from_ymd_opt(2023, 6, 2).unwrap(), Some(0.6)),
        ];
        SoilingSeries::from_samples(&samples).unwrap()
    }

    #[test]
    fn test_write_series_csv() {
        let mut out: Vec<u8> = Vec::new();
        write_series_csv(&mut out, &series()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "date,ndvi,soiling_percent\n2023-06-02,0.6000,25.0\n2023-06-07,0.2500,100.0\n"
        );
    }

    #[test]
    fn test_write_series_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_series_csv_file(&path, &series()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
