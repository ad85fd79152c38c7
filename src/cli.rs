//! The command line interfaces of the harness binaries.
//!
//! this file is also included by `build.rs` to generate the completion scripts, so it must only
//! depend on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// extract timing and resource metrics from a HLS csynth report and append a throughput estimate
#[derive(Parser, Debug)]
#[command(name = "parse_csynth", author, version)]
pub struct ReportCli {
    /// the csynth report, like `jacobi_hls/solution1/syn/report/jacobi2d_hls_csynth.rpt`
    #[arg(long)]
    pub report: PathBuf,
    /// grid rows
    #[arg(long = "N")]
    pub n: usize,
    /// grid columns
    #[arg(long = "M")]
    pub m: usize,
    /// iterations the testbench ran
    #[arg(long)]
    pub iters: usize,
    /// precision label, not interpreted
    #[arg(long, default_value = "fixed16")]
    pub precision: String,
    /// the csv accumulator to append to
    #[arg(long, default_value = "results/fpga_estimates.csv")]
    pub out: PathBuf,
}

/// run jacobi executables over a parameter sweep and collect their csv output
///
/// every executable is called as `exe N N iters precision` and must print one csv line:
/// `backend,precision,N,M,iters,runtime_ms,MLUPS,rel_error`
#[derive(Parser, Debug, Default)]
#[command(name = "bench", author, version)]
pub struct BenchCli {
    /// path to an executable, repeat to run several backends in one sweep
    #[arg(long = "exe")]
    pub exe: Vec<String>,
    /// square grid sizes (N=M) [default: 512 1024 2048]
    #[arg(long, num_args = 1..)]
    pub sizes: Vec<usize>,
    /// iterations per run [default: 500]
    #[arg(long)]
    pub iters: Option<usize>,
    /// precisions to test, like f64 f32 f16 [default: f64 f32]
    #[arg(long, num_args = 1..)]
    pub precisions: Vec<String>,
    /// repeat each configuration [default: 1]
    #[arg(long)]
    pub repeats: Option<usize>,
    /// exported as OMP_NUM_THREADS to every run
    #[arg(long)]
    pub threads: Option<usize>,
    /// extra environment for every run, can repeat
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,
    /// output csv file [default: results/results.csv]
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// a toml sweep file, command line values take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// the image format of the charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

/// draw the throughput and error charts from an accumulated results csv
#[derive(Parser, Debug)]
#[command(name = "plot", author, version)]
pub struct PlotCli {
    /// input results csv
    #[arg(long, default_value = "results/results.csv")]
    pub csv: PathBuf,
    /// output directory for the charts
    #[arg(long, default_value = "results")]
    pub outdir: PathBuf,
    /// the image format
    #[arg(long, value_enum, default_value_t = ChartFormat::Png)]
    pub format: ChartFormat,
}

/// the reference cpu jacobi solver, prints one result line in the bench csv format
#[derive(Parser, Debug)]
#[command(name = "jacobi_ref", author, version)]
pub struct RefSolverCli {
    /// grid rows
    pub n: usize,
    /// grid columns
    pub m: usize,
    /// iterations
    pub iters: usize,
    /// f64 or f32
    pub precision: String,
}
