use std::error::Error;

use itertools::Itertools;
use plotters::{coord::Shift, prelude::*};
use statrs::statistics::Statistics;

use super::{padded_range, ChartPoint, DrawFn, LabeledSeries};

pub const THROUGHPUT_CHART: &str = "throughput_vs_size";

/// mean MLUPS for every distinct grid size of one group, sizes ascending
pub fn mean_throughput_by_size(points: &[&ChartPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| (p.n, p.mlups))
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .group_by(|(n, _)| *n)
        .into_iter()
        .map(|(n, group)| (n, group.map(|(_, mlups)| mlups).mean()))
        .collect()
}

pub struct ThroughputDrawer;

impl DrawFn for ThroughputDrawer {
    type DATA = [LabeledSeries];

    fn draw_apply<'a, DB: DrawingBackend + 'a>(
        root: DrawingArea<DB, Shift>,
        data: &Self::DATA,
    ) -> Result<(), Box<dyn Error + 'a>> {
        draw(root, data)
    }
}

/// one line with circle markers per group
fn draw<'a, DB: DrawingBackend + 'a>(
    root: DrawingArea<DB, Shift>,
    data: &[LabeledSeries],
) -> Result<(), Box<dyn Error + 'a>> {
    let all_points = || data.iter().flat_map(|s| s.points.iter().copied());
    let x_range = padded_range(all_points().map(|(n, _)| n), 0.0..1.0);
    let y_max = all_points()
        .map(|(_, mlups)| mlups)
        .filter(|x| x.is_finite())
        .fold(0f64, f64::max);
    let y_range = 0f64..if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Throughput vs Size", ("sans-serif", 40).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Grid size N (N=M)")
        .y_desc("Throughput (MLUPS)")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    for (idx, series) in data.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            series
                .points
                .iter()
                .map(|&point| Circle::new(point, 5, color.filled())),
        )?;
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
