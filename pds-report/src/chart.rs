use anyhow::Context;
use chrono::{NaiveDate, TimeDelta};
use pds_data::alert::DUST_ALERT_THRESHOLD;
use pds_data::series::SoilingSeries;
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (960u32, 540u32);

/// X-axis bounds for the series. A single-day series is widened by one day
/// so the axis has a non-zero span.
pub fn date_bounds(series: &SoilingSeries) -> (NaiveDate, NaiveDate) {
    let start = series.first().date;
    let end = series.latest().date;
    if start == end {
        (start, end + TimeDelta::days(1))
    } else {
        (start, end)
    }
}

/// Render soiling % (left axis, 0..100) and NDVI (right axis, -1..1) against
/// date, with the alert threshold drawn across the chart.
pub fn render_svg(series: &SoilingSeries, title: &str) -> anyhow::Result<String> {
    let (start, end) = date_bounds(series);
    let mut svg_inner_string = String::new();
    {
        let primary: RangedDate<NaiveDate> = (start..end).into();
        let secondary: RangedDate<NaiveDate> = (start..end).into();

        let backend = SVGBackend::with_string(&mut svg_inner_string, CHART_SIZE);
        let backend_drawing_area = backend.into_drawing_area();
        backend_drawing_area.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&backend_drawing_area)
            .caption(title, ("sans-serif", 22))
            .margin(20i32)
            .x_label_area_size(40u32)
            .y_label_area_size(50u32)
            .right_y_label_area_size(50u32)
            .build_cartesian_2d(primary, 0f64..100f64)?
            .set_secondary_coord(secondary, -1f64..1f64);

        chart
            .configure_mesh()
            .x_labels(10_usize)
            .y_desc("Soiling %")
            .draw()?;
        chart.configure_secondary_axes().y_desc("NDVI").draw()?;

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|p| (p.date, p.soiling_percent)),
                RED,
            ))?
            .label("Soiling %")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        let threshold_style = BLACK.mix(0.5);
        chart
            .draw_series(LineSeries::new(
                vec![(start, DUST_ALERT_THRESHOLD), (end, DUST_ALERT_THRESHOLD)],
                threshold_style,
            ))?
            .label(format!("Alert threshold {:.0}%", DUST_ALERT_THRESHOLD))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], threshold_style));

        chart
            .draw_secondary_series(LineSeries::new(
                series.iter().map(|p| (p.date, p.index_value)),
                GREEN,
            ))?
            .label("NDVI")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        backend_drawing_area.present()?;
    }
    Ok(svg_inner_string)
}

pub fn write_svg_file<P: AsRef<Path>>(path: P, series: &SoilingSeries, title: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    let svg = render_svg(series, title)?;
    std::fs::write(path, svg).with_context(|| format!("writing chart {}", path.display()))?;
    log::info!("Wrote chart to {}", path.display());
    Ok(())
}
