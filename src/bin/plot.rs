use clap::Parser;
use eyre::Result;
use jacobi_bench::{cli::PlotCli, draw, init_logger_info};
use tracing::info;

fn main() -> Result<()> {
    let args = PlotCli::parse();
    init_logger_info();
    info!("plot {:?} into {:?}", args.csv, args.outdir);
    draw::run(args)
}
