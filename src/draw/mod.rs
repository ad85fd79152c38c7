//! the comparison charts drawn from the results csv
//!
//! two separate images, each a single chart:
//! - `throughput_vs_size`: mean MLUPS per grid size, one line per `backend-precision`
//! - `error_vs_throughput`: rel_error against MLUPS on a log y axis

use std::{
    error::Error,
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use plotters::{coord::Shift, prelude::*};
use tracing::{info, warn};

mod error_scatter;
pub mod table;
mod throughput;

pub use error_scatter::{ErrorScatterDrawer, ERROR_CHART};
pub use table::{chart_points, group_by_label, load_results, ChartPoint, ResultRecord};
pub use throughput::{mean_throughput_by_size, ThroughputDrawer, THROUGHPUT_CHART};

use crate::cli::{ChartFormat, PlotCli};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ext {
    Png,
    Svg,
}

pub const CHART_SIZE: (u32, u32) = (1280, 960);

pub trait DrawFn {
    type DATA: ?Sized;
    fn draw_apply<'a, DB: DrawingBackend + 'a>(
        root: DrawingArea<DB, Shift>,
        data: &Self::DATA,
    ) -> Result<(), Box<dyn Error + 'a>>;
}

/// one `backend-precision` group of points
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

pub fn get_ext(output_path: &Path) -> Result<Ext> {
    match output_path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => Ok(Ext::Png),
        Some("svg") => Ok(Ext::Svg),
        _ => Err(eyre::eyre!(
            "unsupported chart file {:?}, use .png or .svg",
            output_path
        )),
    }
}

/// the generic fn to draw the data using the DrawFn
pub fn draw_data<DATA: ?Sized, F: DrawFn<DATA = DATA>>(output_path: &Path, data: &DATA) -> Result<()> {
    info!("draw data into {:?}", output_path);
    match get_ext(output_path)? {
        Ext::Svg => {
            let root = SVGBackend::new(&output_path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;
            F::draw_apply(root, data)
                .map_err(|err| eyre::eyre!("failed to draw {:?}: {}", output_path, err))?;
        }
        Ext::Png => {
            let root = BitMapBackend::new(&output_path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;
            F::draw_apply(root, data)
                .map_err(|err| eyre::eyre!("failed to draw {:?}: {}", output_path, err))?;
        }
    };
    Ok(())
}

/// the span of `values` with some room on both sides, or `default` when there are none
pub(crate) fn padded_range(values: impl Iterator<Item = f64>, default: Range<f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    if lo > hi {
        return default;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.1 };
    (lo - pad)..(hi + pad)
}

/// the chart paths inside `outdir`
pub fn chart_paths(outdir: &Path, format: ChartFormat) -> (PathBuf, PathBuf) {
    let ext = format.extension();
    (
        outdir.join(format!("{THROUGHPUT_CHART}.{ext}")),
        outdir.join(format!("{ERROR_CHART}.{ext}")),
    )
}

/// load the results and write both charts, returning their paths
pub fn draw_results(csv: &Path, outdir: &Path, format: ChartFormat) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(outdir).wrap_err_with(|| format!("cannot create {outdir:?}"))?;
    let records = load_results(csv)?;
    let points = chart_points(&records);
    if points.len() < records.len() {
        warn!(
            "dropped {} of {} rows with missing N, MLUPS, rel_error, backend or precision",
            records.len() - points.len(),
            records.len()
        );
    }
    let groups = group_by_label(&points);
    info!("{} rows in {} groups", points.len(), groups.len());

    let throughput: Vec<_> = groups
        .iter()
        .map(|(label, group)| LabeledSeries {
            label: label.clone(),
            points: mean_throughput_by_size(group),
        })
        .collect();
    let errors: Vec<_> = groups
        .iter()
        .map(|(label, group)| LabeledSeries {
            label: label.clone(),
            points: group.iter().map(|p| (p.mlups, p.rel_error)).collect(),
        })
        .collect();

    let (throughput_path, error_path) = chart_paths(outdir, format);
    draw_data::<_, ThroughputDrawer>(&throughput_path, throughput.as_slice())?;
    draw_data::<_, ErrorScatterDrawer>(&error_path, errors.as_slice())?;
    Ok((throughput_path, error_path))
}

/// the `plot` entry point
pub fn run(cli: PlotCli) -> Result<()> {
    let PlotCli {
        csv,
        outdir,
        format,
    } = cli;
    draw_results(&csv, &outdir, format)?;
    println!("Wrote plots to {}", outdir.display());
    Ok(())
}
