use eyre::Result;

use super::SynthesisMetrics;

/// the throughput implied by the clock period and the initiation interval
///
/// `mlups` is the rate of one pipeline element: one cell update every `ii` cycles at `fmax_mhz`.
/// it is not scaled by the number of grid cells, multiply by the active cells for the grid rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputEstimate {
    pub clock_ns: f64,
    pub ii: u64,
    pub fmax_mhz: f64,
    pub mlups: f64,
}

impl ThroughputEstimate {
    pub fn from_clock_and_ii(clock_ns: f64, ii: u64) -> Result<Self> {
        if clock_ns.is_nan() || clock_ns <= 0.0 || ii == 0 {
            return Err(eyre::eyre!(
                "cannot estimate throughput from clock period {clock_ns} ns and II {ii}"
            ));
        }
        let fmax_mhz = 1000.0 / clock_ns;
        let mlups = (fmax_mhz * 1e6 / ii as f64) / 1e6;
        Ok(Self {
            clock_ns,
            ii,
            fmax_mhz,
            mlups,
        })
    }
}

/// both the clock period and II are needed, anything else in the report is optional
pub fn estimate(metrics: &SynthesisMetrics) -> Result<ThroughputEstimate> {
    match (metrics.clock_ns, metrics.ii) {
        (Some(clock_ns), Some(ii)) => ThroughputEstimate::from_clock_and_ii(clock_ns, ii),
        _ => Err(eyre::eyre!(
            "Could not parse clock period or II from report."
        )),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_three_ns_ii_five() {
        let est = ThroughputEstimate::from_clock_and_ii(3.0, 5).unwrap();
        assert_approx_eq!(f64, est.fmax_mhz, 1000.0 / 3.0, ulps = 2);
        assert_approx_eq!(f64, est.mlups, 66.666_666_666, epsilon = 1e-6);
        assert_eq!(format!("{:.3}", est.mlups), "66.667");
        assert_eq!(format!("{:.2}", est.fmax_mhz), "333.33");
    }

    #[test]
    fn test_missing_fields_fail() {
        let only_clock = SynthesisMetrics {
            clock_ns: Some(3.0),
            ..Default::default()
        };
        assert!(estimate(&only_clock).is_err());
        let only_ii = SynthesisMetrics {
            ii: Some(1),
            ..Default::default()
        };
        assert!(estimate(&only_ii).is_err());
    }

    #[test]
    fn test_degenerate_values_fail() {
        assert!(ThroughputEstimate::from_clock_and_ii(0.0, 1).is_err());
        assert!(ThroughputEstimate::from_clock_and_ii(3.0, 0).is_err());
    }
}
