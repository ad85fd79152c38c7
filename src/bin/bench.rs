use clap::Parser;
use eyre::Result;
use jacobi_bench::{bench, cli::BenchCli, init_logger_info};

fn main() -> Result<()> {
    let args = BenchCli::parse();
    init_logger_info();
    bench::run(args)
}
