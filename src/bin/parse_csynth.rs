use clap::Parser;
use eyre::Result;
use jacobi_bench::{cli::ReportCli, init_logger_info, report};

fn main() -> Result<()> {
    let args = ReportCli::parse();
    init_logger_info();
    report::run(args)
}
