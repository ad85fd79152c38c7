//! regex extraction of the csynth report fields
//!
//! every field is searched independently, the first match wins. nothing here fails: a field
//! that is not found stays `None`.

use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Estimated\s+Clock\s+Period\s*:\s*([\d\.]+)\s*ns").unwrap());

/// min, max and II over three consecutive lines of the latency table
static LATENCY_COMBINED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Latency.*?min\s*=\s*(\d+).*\n.*?max\s*=\s*(\d+).*?\n.*?II\s*=\s*(\d+)")
        .unwrap()
});

static LATENCY_CYCLES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Latency\s*\(cycles\)\s*min\s*=\s*(\d+)\s*max\s*=\s*(\d+)\s*average\s*=\s*\d+")
        .unwrap()
});

static INTERVAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Interval\s*\(II\)\s*=\s*(\d+)").unwrap());

static BRAM_18K: Lazy<Regex> = Lazy::new(|| Regex::new(r"BRAM_18K\s*\|\s*(\d+)").unwrap());
static DSP: Lazy<Regex> = Lazy::new(|| Regex::new(r"DSP48E.*?\|\s*(\d+)").unwrap());
static FF: Lazy<Regex> = Lazy::new(|| Regex::new(r"FF\s*\|\s*(\d+)").unwrap());
static LUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"LUT\s*\|\s*(\d+)").unwrap());

/// the fields found in one report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisMetrics {
    pub clock_ns: Option<f64>,
    pub latency_min: Option<u64>,
    pub latency_max: Option<u64>,
    pub ii: Option<u64>,
    pub resources: ResourceUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    pub bram_18k: Option<u64>,
    pub dsp: Option<u64>,
    pub ff: Option<u64>,
    pub lut: Option<u64>,
}

fn capture<T: std::str::FromStr>(re: &Regex, text: &str, group: usize) -> Option<T> {
    re.captures(text)
        .and_then(|c| c.get(group))
        .and_then(|m| m.as_str().parse().ok())
}

/// parse the report text
pub fn parse_report(text: &str) -> SynthesisMetrics {
    let clock_ns = capture(&CLOCK_PERIOD, text, 1);

    let (latency_min, latency_max, ii) = match LATENCY_COMBINED.captures(text) {
        Some(c) => (
            c[1].parse().ok(),
            c[2].parse().ok(),
            c[3].parse().ok(),
        ),
        None => {
            let (min, max) = match LATENCY_CYCLES.captures(text) {
                Some(c) => (c[1].parse().ok(), c[2].parse().ok()),
                None => (None, None),
            };
            (min, max, capture(&INTERVAL, text, 1))
        }
    };

    SynthesisMetrics {
        clock_ns,
        latency_min,
        latency_max,
        ii,
        resources: ResourceUsage {
            bram_18k: capture(&BRAM_18K, text, 1),
            dsp: capture(&DSP, text, 1),
            ff: capture(&FF, text, 1),
            lut: capture(&LUT, text, 1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_REPORT: &str = "\
== Performance Estimates
+ Timing:
    * Summary:
    +--------+---------+----------+------------+
    |  Clock |  Target | Estimated| Uncertainty|
    +--------+---------+----------+------------+
    |ap_clk  | 3.33 ns | 2.431 ns |    0.90 ns |
    +--------+---------+----------+------------+
Estimated Clock Period: 2.431 ns

+ Latency:
    * Summary: min = 1048585
    latency max = 1048585
    Interval II = 1
== Utilization Estimates
|Name             | BRAM_18K| DSP48E|   FF   |  LUT  | URAM|
|Total            |        2|      5|    1234|   5678|    0|
|BRAM_18K | 4 |
|DSP48E   | 10 |
|FF | 2048 |
|LUT | 4096 |
";

    const LINE_REPORT: &str = "\
Estimated Clock Period : 3.0 ns
Latency (cycles) min = 120 max = 340 average = 200
Interval (II) = 5
";

    #[test]
    fn test_combined_latency_pattern() {
        let m = parse_report(TABLE_REPORT);
        assert_eq!(m.clock_ns, Some(2.431));
        assert_eq!(m.latency_min, Some(1048585));
        assert_eq!(m.latency_max, Some(1048585));
        assert_eq!(m.ii, Some(1));
    }

    #[test]
    fn test_resource_rows() {
        let m = parse_report(TABLE_REPORT);
        assert_eq!(m.resources.bram_18k, Some(4));
        assert_eq!(m.resources.dsp, Some(10));
        assert_eq!(m.resources.ff, Some(2048));
        assert_eq!(m.resources.lut, Some(4096));
    }

    #[test]
    fn test_fallback_patterns() {
        let m = parse_report(LINE_REPORT);
        assert_eq!(m.clock_ns, Some(3.0));
        assert_eq!(m.latency_min, Some(120));
        assert_eq!(m.latency_max, Some(340));
        assert_eq!(m.ii, Some(5));
        assert_eq!(m.resources, ResourceUsage::default());
    }

    #[test]
    fn test_interval_without_latency() {
        let m = parse_report("estimated clock period: 4 ns\ninterval (ii) = 2\n");
        assert_eq!(m.clock_ns, Some(4.0));
        assert_eq!(m.latency_min, None);
        assert_eq!(m.latency_max, None);
        assert_eq!(m.ii, Some(2));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Estimated Clock Period: 5.0 ns\nEstimated Clock Period: 9.0 ns\n";
        assert_eq!(parse_report(text).clock_ns, Some(5.0));
    }

    #[test]
    fn test_nothing_found() {
        let m = parse_report("no tables here\n");
        assert_eq!(m, SynthesisMetrics::default());
    }

    #[test]
    fn test_malformed_clock_is_missing() {
        let m = parse_report("Estimated Clock Period: 1.2.3 ns\n");
        assert_eq!(m.clock_ns, None);
    }
}
