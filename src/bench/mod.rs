//! the benchmark sweep: every (exe, size, precision, repeat) runs once, one process at a time
//!
//! failed runs are logged and skipped. the successful rows are buffered and appended to the
//! results csv in one go at the end.

mod run;

use eyre::Result;
use tracing::{error, info, warn};

pub use run::{
    env_overrides, parse_result_line, run_once, RunFailure, RunSpec, MIN_CSV_VALUES,
    RESULT_FIELDS, THREADS_VAR,
};

use crate::{
    cli::BenchCli,
    config::Sweep,
    tools::{CsvAccumulator, Record},
};

/// columns of the results csv
pub const HEADER: &[&str] = &[
    "backend",
    "precision",
    "N",
    "M",
    "iters",
    "runtime_ms",
    "MLUPS",
    "rel_error",
    "exe",
    "timestamp",
];

/// what a finished sweep did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    pub runs: usize,
    pub failures: usize,
    pub rows_written: usize,
}

/// run every combination, returning the collected rows and the failure count
pub fn collect_rows(sweep: &Sweep) -> (Vec<Record>, usize) {
    let env = env_overrides(sweep.threads, &sweep.env);
    let mut rows = vec![];
    let mut failures = 0;
    for exe in &sweep.exes {
        for &n in &sweep.sizes {
            for precision in &sweep.precisions {
                for r in 0..sweep.repeats {
                    info!(
                        "Running: exe={exe} N={n} M={n} iters={} precision={precision} repeat={}/{}",
                        sweep.iters,
                        r + 1,
                        sweep.repeats
                    );
                    let spec = RunSpec {
                        exe,
                        n,
                        iters: sweep.iters,
                        precision,
                    };
                    match run_once(&spec, &env) {
                        Ok(row) => rows.push(row),
                        Err(failure) => {
                            failures += 1;
                            match failure {
                                RunFailure::NotCsv(_) | RunFailure::TooFewFields(_) => {
                                    warn!("{failure}")
                                }
                                _ => error!("{failure}"),
                            }
                        }
                    }
                }
            }
        }
    }
    (rows, failures)
}

/// ensure the results header, run the sweep and append the rows
pub fn run_sweep(sweep: &Sweep) -> Result<SweepSummary> {
    let out = CsvAccumulator::new(&sweep.out, HEADER);
    out.ensure_header()?;

    let (rows, failures) = collect_rows(sweep);
    let rows_written = if rows.is_empty() {
        warn!("No rows written; check errors above.");
        0
    } else {
        let written = out.append(&rows)?;
        info!("Wrote {} rows to {:?}", written, out.path());
        written
    };
    Ok(SweepSummary {
        runs: sweep.total_runs(),
        failures,
        rows_written,
    })
}

/// the `bench` entry point
pub fn run(cli: BenchCli) -> Result<()> {
    let sweep = Sweep::resolve(cli)?;
    info!(
        "sweep of {} runs, writing to {:?}",
        sweep.total_runs(),
        sweep.out
    );
    let summary = run_sweep(&sweep)?;
    if summary.failures > 0 {
        warn!("{} of {} runs failed", summary.failures, summary.runs);
    }
    if summary.rows_written > 0 {
        println!(
            "Wrote {} rows to {}",
            summary.rows_written,
            sweep.out.display()
        );
    } else {
        println!("No rows written; check errors above.");
    }
    Ok(())
}
