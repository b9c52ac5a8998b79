//! PNG line charts rendered with Plotters.
//!
//! Trade volume and its YoY growth share one chart (volume on the left axis,
//! growth on the right). Every other metric gets a single-axis chart.

use std::error::Error;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordi32;
use plotters::prelude::*;

use crate::domain::{Dataset, Metric, Series};
use crate::error::AppError;
use crate::plot::axis::{date_labels, value_bounds};

const CHART_SIZE: (u32, u32) = (2000, 1000);
const MAX_X_LABELS: usize = 12;
const FONT: &str = "sans-serif";

type DrawResult = Result<(), Box<dyn Error>>;

/// A series projected onto a shared date axis: `(point index, value)`.
struct Projected {
    points: Vec<(i32, f64)>,
    bounds: (f64, f64),
}

/// Render every chart into `out_dir`, returning the written paths.
///
/// Metrics without records are skipped.
pub fn render_charts(dataset: &Dataset, out_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(out_dir)
        .map_err(|e| AppError::new(5, format!("Failed to create chart dir '{}': {e}", out_dir.display())))?;

    let mut written = Vec::new();

    let trade = dataset.series(Metric::SeaborneTrade);
    let growth = dataset.series(Metric::TradeGrowth);
    let path = out_dir.join(format!("{}.png", Metric::SeaborneTrade.key()));
    if render_pair(trade, growth, &path)? {
        written.push(path);
    }

    for metric in [
        Metric::ClarkSeaIndex,
        Metric::NewbuildPriceIndex,
        Metric::Co2Emissions,
        Metric::PortCongestion,
    ] {
        let path = out_dir.join(format!("{}.png", metric.key()));
        if render_single(dataset.series(metric), &path)? {
            written.push(path);
        }
    }

    Ok(written)
}

fn render_single(series: &Series, path: &Path) -> Result<bool, AppError> {
    let dates = merged_dates(&[series]);
    let Some(line) = project(series, &dates) else {
        tracing::warn!(series = %series.metric, "no records, chart skipped");
        return Ok(false);
    };
    let labels = date_labels(&dates, MAX_X_LABELS);

    draw_single(path, series, &line, &labels, dates.len())
        .map_err(|e| AppError::new(5, format!("Failed to render '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), points = dates.len(), "chart written");
    Ok(true)
}

fn render_pair(left: &Series, right: &Series, path: &Path) -> Result<bool, AppError> {
    let dates = merged_dates(&[left, right]);
    let (Some(l), Some(r)) = (project(left, &dates), project(right, &dates)) else {
        tracing::warn!(series = %left.metric, "no records, chart skipped");
        return Ok(false);
    };
    let labels = date_labels(&dates, MAX_X_LABELS);

    draw_pair(path, (left, &l), (right, &r), &labels, dates.len())
        .map_err(|e| AppError::new(5, format!("Failed to render '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), points = dates.len(), "chart written");
    Ok(true)
}

/// Sorted union of the dates of `series`.
fn merged_dates(series: &[&Series]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.records.iter().map(|r| r.date))
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

fn project(series: &Series, dates: &[NaiveDate]) -> Option<Projected> {
    let points: Vec<(i32, f64)> = series
        .records
        .iter()
        .filter_map(|r| {
            let idx = dates.binary_search(&r.date).ok()?;
            Some((idx as i32, r.value.as_f64()))
        })
        .collect();
    let values: Vec<f64> = points.iter().map(|p| p.1).collect();
    let bounds = value_bounds(&values)?;
    Some(Projected { points, bounds })
}

fn x_axis(labels: &[(usize, String)], n_points: usize) -> WithKeyPoints<RangedCoordi32> {
    let last = n_points.saturating_sub(1).max(1) as i32;
    (0..last).with_key_points(labels.iter().map(|(i, _)| *i as i32).collect())
}

fn label_at(labels: &[(usize, String)], idx: i32) -> String {
    labels
        .iter()
        .find(|(i, _)| *i as i32 == idx)
        .map(|(_, l)| l.clone())
        .unwrap_or_default()
}

fn axis_desc(series: &Series) -> String {
    format!("{}/{}", series.metric.title(), series.unit)
}

fn draw_single(
    path: &Path,
    series: &Series,
    line: &Projected,
    labels: &[(usize, String)],
    n_points: usize,
) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (y0, y1) = line.bounds;
    let mut chart = ChartBuilder::on(&root)
        .caption(series.metric.title(), (FONT, 36))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 100)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(x_axis(labels, n_points), y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(axis_desc(series))
        .x_labels(MAX_X_LABELS + 1)
        .x_label_formatter(&|i| label_at(labels, *i))
        .label_style((FONT, 18))
        .draw()?;

    chart.draw_series(LineSeries::new(line.points.iter().copied(), BLACK.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

fn draw_pair(
    path: &Path,
    (left, l): (&Series, &Projected),
    (right, r): (&Series, &Projected),
    labels: &[(usize, String)],
    n_points: usize,
) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(left.metric.title(), (FONT, 36))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 100)
        .set_label_area_size(LabelAreaPosition::Right, 100)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(x_axis(labels, n_points), l.bounds.0..l.bounds.1)?
        .set_secondary_coord(x_axis(labels, n_points), r.bounds.0..r.bounds.1);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(axis_desc(left))
        .x_labels(MAX_X_LABELS + 1)
        .x_label_formatter(&|i| label_at(labels, *i))
        .label_style((FONT, 18))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc(axis_desc(right))
        .label_style((FONT, 18))
        .draw()?;

    let left_desc = axis_desc(left);
    chart
        .draw_series(LineSeries::new(l.points.iter().copied(), BLACK.stroke_width(2)))?
        .label(left_desc)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    let right_desc = axis_desc(right);
    chart
        .draw_secondary_series(LineSeries::new(r.points.iter().copied(), BLUE.stroke_width(2)))?
        .label(right_desc)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FONT, 20))
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, Value, parse_date_key};

    fn series(metric: Metric, rows: &[(&str, f64)]) -> Series {
        let mut s = Series::empty(metric);
        s.records = rows
            .iter()
            .map(|(k, v)| Record {
                date: parse_date_key(k).unwrap(),
                value: Value::Float(*v),
            })
            .collect();
        s
    }

    #[test]
    fn pair_dates_are_merged_and_projected() {
        let trade = series(Metric::SeaborneTrade, &[("20240301", 1.0), ("20240308", 2.0)]);
        let growth = series(Metric::TradeGrowth, &[("20240308", 0.5), ("20240315", 0.7)]);
        let dates = merged_dates(&[&trade, &growth]);
        assert_eq!(dates.len(), 3);

        let g = project(&growth, &dates).unwrap();
        assert_eq!(g.points, vec![(1, 0.5), (2, 0.7)]);
    }

    #[test]
    fn empty_series_is_not_projected() {
        let empty = Series::empty(Metric::Co2Emissions);
        assert!(project(&empty, &[]).is_none());
    }

    #[test]
    fn empty_dataset_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let written = render_charts(&Dataset::empty(), &out).unwrap();
        assert!(written.is_empty());
        assert!(out.is_dir());
    }

    #[test]
    fn renders_pair_and_single_charts() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [("20231225", 1.0), ("20240101", 2.0), ("20240108", 1.5), ("20240215", 3.0)];
        let mut ds = Dataset::empty();
        for metric in Metric::ALL {
            *ds.series_mut(metric) = series(metric, &rows);
        }
        *ds.series_mut(Metric::PortCongestion) = series(Metric::PortCongestion, &[("20240301", 55.0)]);

        let written = render_charts(&ds, dir.path()).unwrap();
        assert_eq!(written.len(), 5);
        assert!(written.iter().all(|p| p.is_file()));
        assert!(dir.path().join("world_seaborne_trade.png").is_file());
    }

    #[test]
    fn unlabelled_ticks_are_blank() {
        let labels = vec![(0, "2024-03-01".to_string()), (4, "17".to_string())];
        assert_eq!(label_at(&labels, 4), "17");
        assert_eq!(label_at(&labels, 2), "");
    }
}
