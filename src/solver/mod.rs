//! a reference 2D Jacobi solver speaking the `bench` executable protocol
//!
//! the grid starts with the top row at 1.0 and everything else at 0.0. each iteration copies the
//! boundary through and replaces every interior cell with the mean of its four neighbors.

use std::{fmt::Display, str::FromStr, time::Instant};

use eyre::Result;
use num_traits::Float;
use tracing::debug;

/// the float types the solver runs in
pub trait Real: Float + From<f32> + Into<f64> {}
impl Real for f32 {}
impl Real for f64 {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    F64,
    F32,
}

impl FromStr for Precision {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f64" => Ok(Precision::F64),
            "f32" => Ok(Precision::F32),
            _ => Err(eyre::eyre!("unsupported precision {s:?}, use f64 or f32")),
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precision::F64 => write!(f, "f64"),
            Precision::F32 => write!(f, "f32"),
        }
    }
}

/// a row major n x m grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    pub n: usize,
    pub m: usize,
    pub data: Vec<T>,
}

impl<T: Real> Grid<T> {
    pub fn with_hot_top_edge(n: usize, m: usize) -> Self {
        let mut data = vec![T::zero(); n * m];
        data[..m].fill(T::one());
        Self { n, m, data }
    }

    pub fn checksum(&self) -> f64 {
        self.data.iter().map(|&x| Into::<f64>::into(x)).sum()
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&x| Into::<f64>::into(x)).collect()
    }

    /// cells that change every iteration
    pub fn interior_cells(&self) -> usize {
        self.n.saturating_sub(2) * self.m.saturating_sub(2)
    }
}

/// one iteration from `input` into `output`
pub fn jacobi_step<T: Real>(input: &[T], output: &mut [T], n: usize, m: usize) {
    debug_assert_eq!(input.len(), n * m);
    debug_assert_eq!(output.len(), n * m);
    let quarter = <T as From<f32>>::from(0.25);
    for i in 0..n {
        for j in 0..m {
            let idx = i * m + j;
            output[idx] = if i == 0 || j == 0 || i == n - 1 || j == m - 1 {
                input[idx]
            } else {
                let up = input[idx - m];
                let down = input[idx + m];
                let left = input[idx - 1];
                let right = input[idx + 1];
                quarter * (up + down + left + right)
            };
        }
    }
}

/// run `iters` iterations, alternating the two buffers
pub fn solve<T: Real>(n: usize, m: usize, iters: usize) -> Grid<T> {
    let mut current = Grid::<T>::with_hot_top_edge(n, m);
    let mut next = current.data.clone();
    for _ in 0..iters {
        jacobi_step(&current.data, &mut next, n, m);
        std::mem::swap(&mut current.data, &mut next);
    }
    current
}

/// `||x - reference|| / ||reference||` in the 2-norm
pub fn relative_error(x: &[f64], reference: &[f64]) -> f64 {
    let (diff, norm) = x
        .iter()
        .zip(reference)
        .fold((0.0, 0.0), |(diff, norm), (&a, &b)| {
            (diff + (a - b) * (a - b), norm + b * b)
        });
    if norm == 0.0 {
        if diff == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (diff / norm).sqrt()
    }
}

/// what one reference run measured
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub precision: Precision,
    pub n: usize,
    pub m: usize,
    pub iters: usize,
    pub runtime_ms: f64,
    pub mlups: f64,
    pub rel_error: f64,
    pub checksum: f64,
}

pub const BACKEND: &str = "cpu_ref";

impl SolveReport {
    /// `backend,precision,N,M,iters,runtime_ms,MLUPS,rel_error`
    pub fn csv_line(&self) -> String {
        format!(
            "{BACKEND},{},{},{},{},{:.3},{:.3},{:.6e}",
            self.precision, self.n, self.m, self.iters, self.runtime_ms, self.mlups, self.rel_error
        )
    }
}

fn timed<T: Real>(n: usize, m: usize, iters: usize) -> (Grid<T>, f64) {
    let start = Instant::now();
    let grid = solve::<T>(n, m, iters);
    (grid, start.elapsed().as_secs_f64())
}

/// run the solver in `precision`; the error is measured against an f64 run
pub fn run_reference(n: usize, m: usize, iters: usize, precision: Precision) -> Result<SolveReport> {
    if n < 3 || m < 3 {
        return Err(eyre::eyre!("grid must be at least 3x3, got {n}x{m}"));
    }
    let (values, checksum, interior, secs) = match precision {
        Precision::F64 => {
            let (grid, secs) = timed::<f64>(n, m, iters);
            (grid.to_f64(), grid.checksum(), grid.interior_cells(), secs)
        }
        Precision::F32 => {
            let (grid, secs) = timed::<f32>(n, m, iters);
            (grid.to_f64(), grid.checksum(), grid.interior_cells(), secs)
        }
    };
    let rel_error = match precision {
        Precision::F64 => 0.0,
        _ => relative_error(&values, &solve::<f64>(n, m, iters).data),
    };
    debug!("{precision} {n}x{m} iters={iters} checksum={checksum:.6}");
    let secs = secs.max(1e-9);
    Ok(SolveReport {
        precision,
        n,
        m,
        iters,
        runtime_ms: secs * 1e3,
        mlups: (interior * iters) as f64 / secs / 1e6,
        rel_error,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_uniform_grid_is_fixed_point() {
        let (n, m) = (6, 5);
        let input = vec![1.0f64; n * m];
        let mut output = vec![0.0f64; n * m];
        jacobi_step(&input, &mut output, n, m);
        for x in output {
            assert_approx_eq!(f64, x, 1.0);
        }
    }

    #[test]
    fn test_one_step_from_hot_edge() {
        let grid = solve::<f64>(4, 4, 1);
        // row 1 interior cells see the hot top neighbor
        assert_approx_eq!(f64, grid.data[4 + 1], 0.25);
        assert_approx_eq!(f64, grid.data[4 + 2], 0.25);
        assert_approx_eq!(f64, grid.data[2 * 4 + 1], 0.0);
        // boundary copied through
        assert_eq!(&grid.data[..4], &[1.0; 4]);
        assert_eq!(grid.data[4], 0.0);
    }

    #[test]
    fn test_checksum_grows() {
        let before = Grid::<f32>::with_hot_top_edge(8, 8).checksum();
        let after = solve::<f32>(8, 8, 10).checksum();
        assert_approx_eq!(f64, before, 8.0);
        assert!(after > before);
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_approx_eq!(f64, relative_error(&[0.0, 4.0], &[0.0, 2.0]), 1.0);
        assert_eq!(relative_error(&[0.0], &[0.0]), 0.0);
    }

    #[test]
    fn test_reference_run_line() {
        let report = run_reference(16, 12, 20, Precision::F64).unwrap();
        assert_eq!(report.rel_error, 0.0);
        let line = report.csv_line();
        let fields: Vec<_> = line.split(',').collect();
        assert_eq!(fields.len(), 8);
        assert_eq!(&fields[..5], &["cpu_ref", "f64", "16", "12", "20"]);
        assert_eq!(fields[7].parse::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn test_f32_error_is_small() {
        let report = run_reference(32, 32, 50, Precision::F32).unwrap();
        assert!(report.rel_error >= 0.0);
        assert!(report.rel_error < 1e-4);
        assert!(report.mlups > 0.0);
    }

    #[test]
    fn test_bad_input() {
        assert!("f16".parse::<Precision>().is_err());
        assert_eq!("f32".parse::<Precision>().unwrap(), Precision::F32);
        assert!(run_reference(2, 10, 1, Precision::F64).is_err());
    }
}
