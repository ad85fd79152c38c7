use std::{
    collections::BTreeMap,
    io,
    process::{Command, ExitStatus, Stdio},
};

use derive_more::Display;
use tracing::{debug, warn};

use crate::tools::{utc_timestamp, Record};

/// the variable `--threads` is exported as
pub const THREADS_VAR: &str = "OMP_NUM_THREADS";

/// fields every executable must print: backend,precision,N,M,iters,runtime_ms,MLUPS,rel_error
pub const RESULT_FIELDS: usize = 8;
/// fewer values than this and the line is not considered csv at all
pub const MIN_CSV_VALUES: usize = 7;

/// why a single run produced no row. none of these stop the sweep.
#[derive(Debug, Display)]
pub enum RunFailure {
    #[display(fmt = "Executable not found: {}", _0)]
    NotFound(String),
    #[display(fmt = "Cannot start {}: {}", exe, source)]
    Spawn { exe: String, source: io::Error },
    #[display(fmt = "Command failed ({}, {}): {}", exe, status, stderr)]
    Failed {
        exe: String,
        status: ExitStatus,
        stderr: String,
    },
    #[display(fmt = "Output did not look like expected CSV: '{}'", _0)]
    NotCsv(String),
    #[display(fmt = "CSV had fewer than {} fields: '{}'", RESULT_FIELDS, _0)]
    TooFewFields(String),
}

/// one point of the sweep
#[derive(Debug, Clone, Copy)]
pub struct RunSpec<'a> {
    pub exe: &'a str,
    pub n: usize,
    pub iters: usize,
    pub precision: &'a str,
}

impl RunSpec<'_> {
    /// the grid is square, the size is passed as both N and M
    pub fn args(&self) -> [String; 4] {
        [
            self.n.to_string(),
            self.n.to_string(),
            self.iters.to_string(),
            self.precision.to_string(),
        ]
    }
}

/// the variables set on top of the inherited environment
///
/// `threads` goes first, then `extra` in order, so a later `KEY=VALUE` wins over an earlier one.
/// items without `=` are ignored.
pub fn env_overrides(threads: Option<usize>, extra: &[String]) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    if let Some(threads) = threads {
        env.insert(THREADS_VAR.to_string(), threads.to_string());
    }
    for item in extra {
        match item.split_once('=') {
            Some((key, value)) => {
                env.insert(key.to_string(), value.to_string());
            }
            None => warn!("ignoring env item without '=': {item:?}"),
        }
    }
    env
}

/// take the last non-empty line of stdout and normalize it to [RESULT_FIELDS] trimmed fields
pub fn parse_result_line(stdout: &str) -> Result<Vec<String>, RunFailure> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default();
    if line.is_empty() || line.matches(',').count() < MIN_CSV_VALUES - 1 {
        return Err(RunFailure::NotCsv(line.to_string()));
    }
    let mut fields: Vec<String> = line.split(',').map(|x| x.trim().to_string()).collect();
    if fields.len() < RESULT_FIELDS {
        return Err(RunFailure::TooFewFields(line.to_string()));
    }
    fields.truncate(RESULT_FIELDS);
    Ok(fields)
}

/// run the executable once and turn its output into a result row with provenance
pub fn run_once(spec: &RunSpec, env: &BTreeMap<String, String>) -> Result<Record, RunFailure> {
    let output = Command::new(spec.exe)
        .args(spec.args())
        .envs(env)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RunFailure::NotFound(spec.exe.to_string()),
            _ => RunFailure::Spawn {
                exe: spec.exe.to_string(),
                source,
            },
        })?;
    if !output.status.success() {
        return Err(RunFailure::Failed {
            exe: spec.exe.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!("stdout of {}: {:?}", spec.exe, stdout);
    let mut row = parse_result_line(&stdout)?;
    row.push(spec.exe.to_string());
    row.push(utc_timestamp());
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_eight_fields_kept() {
        let row = parse_result_line("cpu,f64,512,512,500,12.5,10485.76,1e-12\n").unwrap();
        assert_eq!(
            row,
            vec!["cpu", "f64", "512", "512", "500", "12.5", "10485.76", "1e-12"]
        );
    }

    #[test]
    fn test_extra_fields_truncated() {
        let row = parse_result_line("cpu,f64,512,512,500,12.5,10485.76,1e-12,extra,more").unwrap();
        assert_eq!(row.len(), RESULT_FIELDS);
        assert_eq!(row[7], "1e-12");
    }

    #[test]
    fn test_last_non_empty_line_and_trim() {
        let stdout = "warming up\nignored,line\n  gpu , f32 ,64,64,10,1.0,2.0,0.5  \n\n   \n";
        let row = parse_result_line(stdout).unwrap();
        assert_eq!(row, vec!["gpu", "f32", "64", "64", "10", "1.0", "2.0", "0.5"]);
    }

    #[test]
    fn test_short_lines_rejected() {
        assert!(matches!(
            parse_result_line("a,b,c,d,e,f"),
            Err(RunFailure::NotCsv(_))
        ));
        assert!(matches!(
            parse_result_line("a,b,c,d,e,f,g"),
            Err(RunFailure::TooFewFields(_))
        ));
        assert!(matches!(parse_result_line(""), Err(RunFailure::NotCsv(_))));
        assert!(matches!(
            parse_result_line("\n \n"),
            Err(RunFailure::NotCsv(_))
        ));
    }

    #[test]
    fn test_env_overrides_last_wins() {
        let env = env_overrides(
            Some(4),
            &[
                "A=1".to_string(),
                "A=2".to_string(),
                "B=x=y".to_string(),
                "broken".to_string(),
                "OMP_NUM_THREADS=16".to_string(),
            ],
        );
        assert_eq!(env.get("A").map(String::as_str), Some("2"));
        assert_eq!(env.get("B").map(String::as_str), Some("x=y"));
        assert_eq!(env.get(THREADS_VAR).map(String::as_str), Some("16"));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_threads_only() {
        let env = env_overrides(Some(8), &[]);
        assert_eq!(env.get(THREADS_VAR).map(String::as_str), Some("8"));
    }

    #[test]
    fn test_missing_executable() {
        let spec = RunSpec {
            exe: "./definitely/not/here",
            n: 8,
            iters: 1,
            precision: "f64",
        };
        let err = run_once(&spec, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RunFailure::NotFound(_)));
        assert_eq!(err.to_string(), "Executable not found: ./definitely/not/here");
    }
}
