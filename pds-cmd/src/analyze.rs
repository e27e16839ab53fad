//! Soiling assessment for one site over one date range.
//!
//! Steps: resolve the site, fetch NDVI samples, normalize and classify,
//! write the requested reports, and mail an alert when the site is dusty.

use crate::config::AppConfig;
use chrono::NaiveDate;
use clap::Args;
use log::{info, warn};
use pds_data::alert::{assess, Assessment, ClassificationPolicy};
use pds_notify::smtp::SmtpAlertMessenger;
use pds_notify::{AlertMessenger, DustAlert, LogAlertMessenger};
use pds_report::{chart, map, table};
use pds_sentinel::geocode::NominatimGeocoder;
use pds_sentinel::statistics::SentinelHubClient;
use pds_sentinel::{
    AreaOfInterest, CsvSampleSource, DateWindow, Location, SampleRequest, SampleSource,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "Calle del Sol, Almería, Spain";

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Site address to geocode (defaults to a sample site in Almería)
    #[arg(short = 'a', long, conflicts_with = "lat")]
    pub address: Option<String>,

    /// Site latitude in decimal degrees (skips geocoding)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Site longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// First day of the window (YYYY-MM-DD)
    #[arg(short = 's', long, default_value = "2023-06-01")]
    pub start: NaiveDate,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(short = 'e', long, default_value = "2023-08-31")]
    pub end: NaiveDate,

    /// Exclude passes with more cloud cover than this percentage
    #[arg(long)]
    pub cloud_ceiling: Option<f64>,

    /// Radius around the site to average over, in meters
    #[arg(long = "buffer-m")]
    pub buffer_meters: Option<f64>,

    /// Statistic compared against the alert threshold: maximum, latest or mean
    #[arg(short = 'p', long)]
    pub policy: Option<ClassificationPolicy>,

    /// Read samples from a `date,ndvi` CSV instead of Sentinel Hub
    #[arg(long)]
    pub samples_csv: Option<PathBuf>,

    /// Output path for the soiling series CSV
    #[arg(long)]
    pub series_csv: Option<PathBuf>,

    /// Output path for the SVG chart
    #[arg(long)]
    pub chart_svg: Option<PathBuf>,

    /// Output path for the GeoJSON site map
    #[arg(long)]
    pub map_geojson: Option<PathBuf>,

    /// Email the configured recipients when the site is dusty
    #[arg(long)]
    pub notify: bool,

    /// Log the alert email instead of sending it
    #[arg(long, requires = "notify")]
    pub dry_run: bool,

    /// Path to a TOML config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Where reports go; `None` skips that report.
#[derive(Debug, Clone, Default)]
pub struct ReportPaths {
    pub series_csv: Option<PathBuf>,
    pub chart_svg: Option<PathBuf>,
    pub map_geojson: Option<PathBuf>,
}

/// Shared HTTP client for the geocoder and the statistics service.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?)
}

/// Fetch samples for the request and assess them.
pub async fn run_analysis(
    source: &dyn SampleSource,
    request: &SampleRequest,
    policy: ClassificationPolicy,
) -> anyhow::Result<Assessment> {
    let samples = source.fetch_samples(request).await?;
    info!(
        "{} samples between {} and {}",
        samples.len(),
        request.window.start(),
        request.window.end()
    );
    Ok(assess(&samples, policy))
}

/// Write whichever reports were requested. With no data only the map is
/// written, since there is no series to tabulate or plot.
pub fn write_reports(
    paths: &ReportPaths,
    area: &AreaOfInterest,
    assessment: &Assessment,
) -> anyhow::Result<()> {
    let (series, decision) = match assessment {
        Assessment::Assessed { series, decision } => (Some(series), Some(decision)),
        Assessment::NoData { .. } => (None, None),
    };

    if let Some(path) = &paths.series_csv {
        match series {
            Some(series) => table::write_series_csv_file(path, series)?,
            None => warn!("No data; skipping series CSV {}", path.display()),
        }
    }
    if let Some(path) = &paths.chart_svg {
        match series {
            Some(series) => {
                let title = format!("NDVI & soiling: {}", area.center.display_name());
                chart::write_svg_file(path, series, &title)?
            }
            None => warn!("No data; skipping chart {}", path.display()),
        }
    }
    if let Some(path) = &paths.map_geojson {
        let collection = map::site_feature_collection(area, series, decision);
        map::write_geojson_file(path, &collection)?;
    }
    Ok(())
}

/// Send an alert if the assessment says dusty. Returns whether one was sent.
pub async fn notify_if_dusty(
    messenger: &dyn AlertMessenger,
    site: &Location,
    window: DateWindow,
    policy: ClassificationPolicy,
    assessment: &Assessment,
) -> anyhow::Result<bool> {
    match assessment {
        Assessment::Assessed { decision, .. } if decision.is_dusty() => {
            let alert = DustAlert {
                site: site.clone(),
                window,
                decision: *decision,
                policy,
            };
            messenger.send_alert(&alert).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// A site from explicit coordinates; out-of-range values are rejected before
/// they reach the buffer ring or a remote request.
pub fn site_from_coordinates(lat: f64, lon: f64) -> anyhow::Result<Location> {
    if !(-90.0..=90.0).contains(&lat) {
        anyhow::bail!("latitude must be between -90 and 90, got {}", lat);
    }
    if !(-180.0..=180.0).contains(&lon) {
        anyhow::bail!("longitude must be between -180 and 180, got {}", lon);
    }
    Ok(Location::new(lat, lon))
}

fn log_verdict(site: &Location, assessment: &Assessment) {
    match assessment {
        Assessment::NoData { samples } => warn!(
            "No usable NDVI for {} ({} passes, all without data). Try a wider window or a higher cloud ceiling.",
            site.display_name(),
            samples
        ),
        Assessment::Assessed { series, decision } if decision.is_dusty() => warn!(
            "DUSTY: {:.1}% soiling at {} (peak {:.1}% on {}). Clean the panels.",
            decision.soiling_percent,
            site.display_name(),
            series.peak().soiling_percent,
            series.peak().date
        ),
        Assessment::Assessed { series, decision } => info!(
            "CLEAN: {:.1}% soiling at {} over {} passes.",
            decision.soiling_percent,
            site.display_name(),
            series.len()
        ),
    }
}

pub async fn run_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    let client = http_client()?;

    let cloud_ceiling = args.cloud_ceiling.unwrap_or(config.analysis.cloud_ceiling);
    if !(0.0..=100.0).contains(&cloud_ceiling) {
        anyhow::bail!("cloud ceiling must be between 0 and 100, got {}", cloud_ceiling);
    }
    let buffer_meters = args.buffer_meters.unwrap_or(config.analysis.buffer_meters);
    if !(buffer_meters.is_finite() && buffer_meters >= 0.0) {
        anyhow::bail!("buffer must be a non-negative distance, got {}", buffer_meters);
    }
    let policy = args.policy.unwrap_or(config.analysis.policy);
    let window = DateWindow::new(args.start, args.end)?;

    let site = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => site_from_coordinates(lat, lon)?,
        _ => {
            let address = args.address.as_deref().unwrap_or(DEFAULT_ADDRESS);
            NominatimGeocoder::new(client.clone(), config.geocoder.clone())
                .geocode(address)
                .await?
        }
    };

    let request = SampleRequest {
        area: AreaOfInterest::new(site.clone(), buffer_meters),
        window,
        cloud_ceiling,
    };

    let source: Box<dyn SampleSource> = match &args.samples_csv {
        Some(path) => Box::new(CsvSampleSource::from_path(path)?),
        None => Box::new(SentinelHubClient::new(client, config.sentinel_hub.clone())?),
    };

    let assessment = run_analysis(source.as_ref(), &request, policy).await?;
    log_verdict(&site, &assessment);

    let paths = ReportPaths {
        series_csv: args.series_csv,
        chart_svg: args.chart_svg,
        map_geojson: args.map_geojson,
    };
    write_reports(&paths, &request.area, &assessment)?;

    if args.notify {
        let messenger: Box<dyn AlertMessenger> = if args.dry_run {
            Box::new(LogAlertMessenger)
        } else {
            Box::new(SmtpAlertMessenger::new(config.smtp.clone())?)
        };
        let sent =
            notify_if_dusty(messenger.as_ref(), &site, window, policy, &assessment).await?;
        if !sent {
            info!("No alert sent");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pds_data::alert::PanelState;
    use pds_sentinel::location::DEFAULT_BUFFER_METERS;
    use pds_sentinel::Sample;
    use std::sync::Mutex;

    const ALMERIA_CSV: &str = include_str!("../../fixtures/almeria_2023_ndvi.csv");

    /// Samples held in memory, ignoring the request.
    struct FixedSource(Vec<Sample>);

    #[async_trait]
    impl SampleSource for FixedSource {
        async fn fetch_samples(&self, _request: &SampleRequest) -> pds_sentinel::Result<Vec<Sample>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<DustAlert>>,
    }

    #[async_trait]
    impl AlertMessenger for RecordingMessenger {
        async fn send_alert(&self, alert: &DustAlert) -> pds_notify::Result<()> {
            self.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn site() -> Location {
        Location::new(36.8381, -2.4597).with_label("Calle del Sol")
    }

    fn request() -> SampleRequest {
        SampleRequest {
            area: AreaOfInterest::new(site(), DEFAULT_BUFFER_METERS),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
            )
            .unwrap(),
            cloud_ceiling: 20.0,
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_site_from_coordinates_range() {
        let site = site_from_coordinates(36.8381, -2.4597).unwrap();
        assert_eq!(site.latitude, 36.8381);
        assert!(site_from_coordinates(90.0, 180.0).is_ok());
        assert!(site_from_coordinates(-90.0, -180.0).is_ok());
        assert!(site_from_coordinates(200.0, -2.4597).is_err());
        assert!(site_from_coordinates(36.8381, -180.5).is_err());
        assert!(site_from_coordinates(f64::NAN, 0.0).is_err());
    }

    #[tokio::test]
    async fn test_fixture_site_is_dusty() {
        let source = CsvSampleSource::from_csv_str(ALMERIA_CSV).unwrap();
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Maximum)
            .await
            .unwrap();
        match assessment {
            Assessment::Assessed { series, decision } => {
                assert_eq!(series.len(), 16);
                assert_eq!(decision.state, PanelState::Dusty);
                assert_eq!(series.peak().date, day(8, 11));
                assert!((decision.soiling_percent - 53.95).abs() < 1e-6);
            }
            other => panic!("expected assessment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fixture_latest_pass_is_clean() {
        let source = CsvSampleSource::from_csv_str(ALMERIA_CSV).unwrap();
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Latest)
            .await
            .unwrap();
        match assessment {
            Assessment::Assessed { decision, .. } => {
                assert_eq!(decision.state, PanelState::Clean);
                assert!((decision.soiling_percent - 20.275).abs() < 1e-6);
            }
            other => panic!("expected assessment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_usable_samples_is_no_data() {
        let source = FixedSource(vec![Sample::new(day(6, 2), None), Sample::new(day(6, 7), None)]);
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Maximum)
            .await
            .unwrap();
        assert_eq!(assessment, Assessment::NoData { samples: 2 });

        let messenger = RecordingMessenger::default();
        let sent = notify_if_dusty(
            &messenger,
            &site(),
            request().window,
            ClassificationPolicy::Maximum,
            &assessment,
        )
        .await
        .unwrap();
        assert!(!sent);
        assert!(messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dusty_site_sends_one_alert() {
        let source = FixedSource(vec![Sample::new(day(7, 1), Some(0.65)), Sample::new(day(7, 6), Some(0.45))]);
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Maximum)
            .await
            .unwrap();
        let messenger = RecordingMessenger::default();
        let sent = notify_if_dusty(
            &messenger,
            &site(),
            request().window,
            ClassificationPolicy::Maximum,
            &assessment,
        )
        .await
        .unwrap();
        assert!(sent);
        let alerts = messenger.sent.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert!((alerts[0].decision.soiling_percent - 62.5).abs() < 1e-9);
        assert_eq!(alerts[0].site, site());
    }

    #[tokio::test]
    async fn test_clean_site_sends_nothing() {
        let source = FixedSource(vec![Sample::new(day(7, 1), Some(0.68))]);
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Maximum)
            .await
            .unwrap();
        let messenger = RecordingMessenger::default();
        let sent = notify_if_dusty(
            &messenger,
            &site(),
            request().window,
            ClassificationPolicy::Maximum,
            &assessment,
        )
        .await
        .unwrap();
        assert!(!sent);
    }

    #[test]
    fn test_write_reports_without_data_writes_only_map() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ReportPaths {
            series_csv: Some(dir.path().join("series.csv")),
            chart_svg: Some(dir.path().join("chart.svg")),
            map_geojson: Some(dir.path().join("site.geojson")),
        };
        write_reports(&paths, &request().area, &Assessment::NoData { samples: 0 }).unwrap();
        assert!(!dir.path().join("series.csv").exists());
        assert!(!dir.path().join("chart.svg").exists());
        assert!(dir.path().join("site.geojson").exists());
    }

    #[tokio::test]
    async fn test_write_reports_with_series_csv() {
        let source = CsvSampleSource::from_csv_str(ALMERIA_CSV).unwrap();
        let assessment = run_analysis(&source, &request(), ClassificationPolicy::Maximum)
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = ReportPaths {
            series_csv: Some(dir.path().join("series.csv")),
            ..ReportPaths::default()
        };
        write_reports(&paths, &request().area, &assessment).unwrap();
        let text = std::fs::read_to_string(dir.path().join("series.csv")).unwrap();
        assert_eq!(text.lines().count(), 17);
        assert!(text.contains("2023-08-11,0.4842,53.9"));
    }
}
