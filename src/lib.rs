//! a benchmarking harness for 2D Jacobi solvers
//!
//! - [report]: metrics and a throughput estimate from HLS synthesis reports
//! - [bench]: parameter sweeps over solver executables
//! - [draw]: comparison charts from the accumulated results
//! - [solver]: a reference cpu solver speaking the sweep protocol
pub mod bench;
pub mod cli;
pub mod config;
pub mod draw;
pub mod report;
pub mod solver;
pub mod tools;

use std::io;

use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

pub fn init_logger_info() {
    init_logger_with_ansi(LevelFilter::INFO, io::stderr, true);
}

#[allow(dead_code)]
pub fn init_logger_debug() {
    init_logger_with_ansi(LevelFilter::DEBUG, io::stderr, true);
}

/// `RUST_LOG` overrides `filter` when it is set
pub fn init_logger_with_ansi(
    filter: LevelFilter,
    writter: impl for<'writer> MakeWriter<'writer> + 'static + Send + Sync,
    ansi: bool,
) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .with_writer(writter)
        .with_ansi(ansi)
        .try_init()
        .unwrap_or_else(|e| {
            eprintln!("failed to init logger: {}", e);
        });
}
