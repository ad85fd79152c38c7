use clap::Parser;
use eyre::Result;
use jacobi_bench::{
    cli::RefSolverCli,
    init_logger_info,
    solver::{run_reference, Precision},
};

fn main() -> Result<()> {
    let RefSolverCli {
        n,
        m,
        iters,
        precision,
    } = RefSolverCli::parse();
    init_logger_info();
    let precision: Precision = precision.parse()?;
    let report = run_reference(n, m, iters, precision)?;
    // stdout carries only the result line, logs go to stderr
    println!("{}", report.csv_line());
    Ok(())
}
