use std::error::Error;

use plotters::{coord::Shift, prelude::*};
use tracing::debug;

use super::{padded_range, DrawFn, LabeledSeries};

pub const ERROR_CHART: &str = "error_vs_throughput";

/// the error axis span when no point can be placed on it
const DEFAULT_ERROR_RANGE: std::ops::Range<f64> = 1e-16..1.0;

/// only positive errors have a place on a log axis
fn on_log_axis(&(_, err): &(f64, f64)) -> bool {
    err > 0.0 && err.is_finite()
}

/// the log axis span covering every drawable error, one decade of room on each side
pub fn error_range(data: &[LabeledSeries]) -> std::ops::Range<f64> {
    let (lo, hi) = data
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|p| on_log_axis(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, err)| {
            (lo.min(err), hi.max(err))
        });
    if lo > hi {
        DEFAULT_ERROR_RANGE
    } else {
        (lo / 10.0)..(hi * 10.0)
    }
}

pub struct ErrorScatterDrawer;

impl DrawFn for ErrorScatterDrawer {
    type DATA = [LabeledSeries];

    fn draw_apply<'a, DB: DrawingBackend + 'a>(
        root: DrawingArea<DB, Shift>,
        data: &Self::DATA,
    ) -> Result<(), Box<dyn Error + 'a>> {
        draw(root, data)
    }
}

/// scatter of (MLUPS, rel_error), one color per group
fn draw<'a, DB: DrawingBackend + 'a>(
    root: DrawingArea<DB, Shift>,
    data: &[LabeledSeries],
) -> Result<(), Box<dyn Error + 'a>> {
    let x_range = padded_range(
        data.iter().flat_map(|s| s.points.iter().map(|p| p.0)),
        0.0..1.0,
    );
    let mut chart = ChartBuilder::on(&root)
        .caption("Error vs Throughput", ("sans-serif", 40).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, error_range(data).log_scale())?;
    chart
        .configure_mesh()
        .x_desc("Throughput (MLUPS)")
        .y_desc("Relative error vs reference")
        .y_label_formatter(&|y| format!("{y:.0e}"))
        .draw()?;

    for (idx, series) in data.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let hidden = series.points.iter().filter(|p| !on_log_axis(p)).count();
        if hidden > 0 {
            debug!("{}: {hidden} points with a non-positive error", series.label);
        }
        chart
            .draw_series(
                series
                    .points
                    .iter()
                    .filter(|p| on_log_axis(p))
                    .map(|&point| Circle::new(point, 5, color.mix(0.8).filled())),
            )?
            .label(series.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
