//! the sweep settings of `bench`: command line first, then the toml file, then the defaults
//!
//! a sweep file looks like:
//! ```toml
//! exe = ["./fortran/jacobi_cpu", "./target/release/jacobi_ref"]
//! sizes = [512, 1024]
//! iters = 500
//! precisions = ["f64", "f32"]
//! repeats = 3
//! threads = 8
//! env = ["OMP_PROC_BIND=true"]
//! out = "results/results.csv"
//! ```

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::cli::BenchCli;

pub const DEFAULT_SIZES: [usize; 3] = [512, 1024, 2048];
pub const DEFAULT_ITERS: usize = 500;
pub const DEFAULT_PRECISIONS: [&str; 2] = ["f64", "f32"];
pub const DEFAULT_REPEATS: usize = 1;
pub const DEFAULT_OUT: &str = "results/results.csv";

/// the toml sweep file, every key is optional
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub exe: Option<Vec<String>>,
    pub sizes: Option<Vec<usize>>,
    pub iters: Option<usize>,
    pub precisions: Option<Vec<String>>,
    pub repeats: Option<usize>,
    pub threads: Option<usize>,
    pub env: Option<Vec<String>>,
    pub out: Option<PathBuf>,
}

impl SweepConfig {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read sweep config {path:?}"))?;
        toml::from_str(&content).wrap_err_with(|| format!("invalid sweep config {path:?}"))
    }
}

/// the resolved settings of one sweep
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub exes: Vec<String>,
    pub sizes: Vec<usize>,
    pub iters: usize,
    pub precisions: Vec<String>,
    pub repeats: usize,
    pub threads: Option<usize>,
    /// `KEY=VALUE` items, the later ones win
    pub env: Vec<String>,
    pub out: PathBuf,
}

fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

impl Sweep {
    /// resolve the command line, reading `--config` when given
    pub fn resolve(cli: BenchCli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => SweepConfig::new(path)?,
            None => SweepConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: BenchCli, file: SweepConfig) -> Result<Self> {
        let exes = non_empty(cli.exe)
            .or(file.exe)
            .unwrap_or_default();
        if exes.is_empty() {
            return Err(eyre::eyre!(
                "no executable given, use --exe or set `exe` in the sweep config"
            ));
        }
        let sizes = non_empty(cli.sizes)
            .or(file.sizes)
            .unwrap_or_else(|| DEFAULT_SIZES.to_vec());
        let precisions = non_empty(cli.precisions)
            .or(file.precisions)
            .unwrap_or_else(|| DEFAULT_PRECISIONS.iter().map(|x| x.to_string()).collect());
        let repeats = cli.repeats.or(file.repeats).unwrap_or(DEFAULT_REPEATS);
        if repeats == 0 {
            warn!("repeats is 0, nothing will run");
        }
        // file entries first so the command line wins on duplicated keys
        let mut env = file.env.unwrap_or_default();
        env.extend(cli.env);

        Ok(Self {
            exes,
            sizes,
            iters: cli.iters.or(file.iters).unwrap_or(DEFAULT_ITERS),
            precisions,
            repeats,
            threads: cli.threads.or(file.threads),
            env,
            out: cli
                .out
                .or(file.out)
                .unwrap_or_else(|| DEFAULT_OUT.into()),
        })
    }

    /// the number of runs the sweep will start
    pub fn total_runs(&self) -> usize {
        self.exes.len() * self.sizes.len() * self.precisions.len() * self.repeats
    }
}
