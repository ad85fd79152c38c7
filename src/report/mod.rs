//! metrics of a Vitis HLS csynth report and the fpga throughput estimate
//!
//! the parsing is plain regex search over the report text, see [patterns]. only the clock period
//! and the initiation interval are mandatory.

mod estimate;
mod patterns;

use std::{fs, path::Path};

use eyre::{Context, Result};
use tracing::info;

pub use estimate::{estimate, ThroughputEstimate};
pub use patterns::{parse_report, ResourceUsage, SynthesisMetrics};

use crate::{
    cli::ReportCli,
    tools::{utc_timestamp, CsvAccumulator, Record},
};

/// columns of the fpga estimate csv
pub const HEADER: &[&str] = &[
    "backend",
    "precision",
    "N",
    "M",
    "iters",
    "clock_ns",
    "Fmax_MHz",
    "Latency_min",
    "Latency_max",
    "II",
    "MLUPS_est",
    "BRAM18K",
    "DSP",
    "FF",
    "LUT",
    "report",
    "timestamp",
];

/// the backend label of every estimate row
pub const BACKEND: &str = "fpga_est";

/// the problem the report was synthesized for, only copied into the row
#[derive(Debug, Clone)]
pub struct Problem {
    pub n: usize,
    pub m: usize,
    pub iters: usize,
    pub precision: String,
}

/// one row of the estimate csv
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub problem: Problem,
    pub metrics: SynthesisMetrics,
    pub estimate: ThroughputEstimate,
    pub report: String,
    pub timestamp: String,
}

fn opt_field<T: ToString>(value: Option<T>) -> String {
    value.map(|x| x.to_string()).unwrap_or_default()
}

impl MetricRow {
    /// fails when the report lacks the clock period or II
    pub fn new(problem: Problem, metrics: SynthesisMetrics, report: impl AsRef<Path>) -> Result<Self> {
        let estimate = estimate(&metrics)?;
        Ok(Self {
            problem,
            metrics,
            estimate,
            report: report.as_ref().display().to_string(),
            timestamp: utc_timestamp(),
        })
    }

    pub fn record(&self) -> Record {
        let Self {
            problem,
            metrics,
            estimate,
            report,
            timestamp,
        } = self;
        vec![
            BACKEND.to_string(),
            problem.precision.clone(),
            problem.n.to_string(),
            problem.m.to_string(),
            problem.iters.to_string(),
            format!("{:.3}", estimate.clock_ns),
            format!("{:.2}", estimate.fmax_mhz),
            opt_field(metrics.latency_min),
            opt_field(metrics.latency_max),
            estimate.ii.to_string(),
            format!("{:.3}", estimate.mlups),
            opt_field(metrics.resources.bram_18k),
            opt_field(metrics.resources.dsp),
            opt_field(metrics.resources.ff),
            opt_field(metrics.resources.lut),
            report.clone(),
            timestamp.clone(),
        ]
    }
}

/// read the report, estimate the throughput and append one row to `out`
pub fn extract_to_csv(
    report: &Path,
    problem: Problem,
    out: &Path,
) -> Result<MetricRow> {
    info!("parsing report {:?}", report);
    let bytes = fs::read(report).wrap_err_with(|| format!("cannot read report {report:?}"))?;
    let text = String::from_utf8_lossy(&bytes);
    let metrics = parse_report(&text);
    info!("found {:?}", metrics);
    let row = MetricRow::new(problem, metrics, report)?;
    CsvAccumulator::new(out, HEADER).append(&[row.record()])?;
    Ok(row)
}

/// the `parse_csynth` entry point
pub fn run(cli: ReportCli) -> Result<()> {
    let ReportCli {
        report,
        n,
        m,
        iters,
        precision,
        out,
    } = cli;
    let row = extract_to_csv(
        &report,
        Problem {
            n,
            m,
            iters,
            precision,
        },
        &out,
    )?;
    info!(
        "Fmax {:.2} MHz, II {}, estimate {:.3} MLUPS",
        row.estimate.fmax_mhz, row.estimate.ii, row.estimate.mlups
    );
    println!("Wrote estimate to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem {
            n: 1024,
            m: 1024,
            iters: 500,
            precision: "fixed16".to_string(),
        }
    }

    #[test]
    fn test_record_layout() {
        let metrics = parse_report(
            "Estimated Clock Period: 3.0 ns\n\
             Latency (cycles) min = 10 max = 20 average = 15\n\
             Interval (II) = 5\n\
             |LUT | 77 |\n",
        );
        let row = MetricRow::new(problem(), metrics, "syn/report/top.rpt").unwrap();
        let record = row.record();
        assert_eq!(record.len(), HEADER.len());
        assert_eq!(
            &record[..16],
            &[
                "fpga_est", "fixed16", "1024", "1024", "500", "3.000", "333.33", "10", "20", "5",
                "66.667", "", "", "", "77", "syn/report/top.rpt"
            ]
        );
        assert!(record[16].ends_with('Z'));
    }

    #[test]
    fn test_missing_ii_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("top.rpt");
        fs::write(&report, "Estimated Clock Period: 3.0 ns\n|FF | 10 |\n").unwrap();
        let out = dir.path().join("est.csv");
        let err = extract_to_csv(&report, problem(), &out).unwrap_err();
        assert!(err.to_string().contains("clock period or II"));
        assert!(!out.exists());
    }

    #[test]
    fn test_appends_after_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("top.rpt");
        fs::write(&report, "Estimated Clock Period: 4.0 ns\nInterval (II) = 1\n").unwrap();
        let out = dir.path().join("results/est.csv");
        extract_to_csv(&report, problem(), &out).unwrap();
        extract_to_csv(&report, problem(), &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER.join(","));
        assert!(lines[1].starts_with("fpga_est,fixed16,1024,1024,500,4.000,250.00,,,1,250.000,"));
        assert_eq!(lines[1].split(',').count(), HEADER.len());
    }

    #[test]
    fn test_non_utf8_report_is_read_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("top.rpt");
        let mut bytes = b"\xff\xfe junk\n".to_vec();
        bytes.extend_from_slice(b"Estimated Clock Period: 2.0 ns\nInterval (II) = 2\n");
        fs::write(&report, bytes).unwrap();
        let row = extract_to_csv(&report, problem(), &dir.path().join("est.csv")).unwrap();
        assert_eq!(row.estimate.mlups, 250.0);
    }
}
