//! loading the accumulated results csv for charting
//!
//! columns are looked up by header name. numeric cells that do not parse become `None`, just like
//! empty cells, so one bad value only removes its own row from the charts.

use std::{collections::BTreeMap, path::Path};

use eyre::{Context, Result};
use itertools::Itertools;

/// columns a row needs to appear in any chart
pub const REQUIRED_COLUMNS: [&str; 5] = ["N", "MLUPS", "rel_error", "backend", "precision"];

/// one row of the results csv after coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRecord {
    pub backend: Option<String>,
    pub precision: Option<String>,
    pub n: Option<f64>,
    pub m: Option<f64>,
    pub iters: Option<f64>,
    pub runtime_ms: Option<f64>,
    pub mlups: Option<f64>,
    pub rel_error: Option<f64>,
}

/// a row with every charting column present
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// `backend-precision`
    pub label: String,
    pub n: f64,
    pub mlups: f64,
    pub rel_error: f64,
}

fn coerce(field: Option<&str>) -> Option<f64> {
    field
        .map(str::trim)
        .and_then(|x| x.parse::<f64>().ok())
        .filter(|x| !x.is_nan())
}

fn text(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
}

/// read the results csv. a missing file or a missing charting column is an error.
pub fn load_results(path: &Path) -> Result<Vec<ResultRecord>> {
    if !path.exists() {
        return Err(eyre::eyre!("CSV not found: {}", path.display()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .wrap_err_with(|| format!("cannot open {path:?}"))?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|&&name| column(name).is_none()) {
        return Err(eyre::eyre!("column {missing} is missing in {}", path.display()));
    }
    let [backend, precision, n, m, iters, runtime_ms, mlups, rel_error] = [
        "backend",
        "precision",
        "N",
        "M",
        "iters",
        "runtime_ms",
        "MLUPS",
        "rel_error",
    ]
    .map(column);

    let mut records = vec![];
    for record in reader.records() {
        let record = record?;
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i));
        records.push(ResultRecord {
            backend: text(get(backend)),
            precision: text(get(precision)),
            n: coerce(get(n)),
            m: coerce(get(m)),
            iters: coerce(get(iters)),
            runtime_ms: coerce(get(runtime_ms)),
            mlups: coerce(get(mlups)),
            rel_error: coerce(get(rel_error)),
        });
    }
    Ok(records)
}

/// keep the rows that have every charting column
pub fn chart_points(records: &[ResultRecord]) -> Vec<ChartPoint> {
    records
        .iter()
        .filter_map(|r| {
            let (backend, precision) = (r.backend.as_ref()?, r.precision.as_ref()?);
            Some(ChartPoint {
                label: format!("{backend}-{precision}"),
                n: r.n?,
                mlups: r.mlups?,
                rel_error: r.rel_error?,
            })
        })
        .collect()
}

/// group the points by label, labels sorted
pub fn group_by_label(points: &[ChartPoint]) -> BTreeMap<String, Vec<&ChartPoint>> {
    points
        .iter()
        .into_group_map_by(|p| p.label.clone())
        .into_iter()
        .collect()
}
