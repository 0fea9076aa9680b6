//! Performance Monitor
//!
//! Process-scoped latency buckets for the rewrite pipeline, with summary
//! statistics (mean, median, nearest-rank percentiles). Samples are kept for
//! the lifetime of the monitor and never persisted.

use std::fmt::Write as _;
use std::sync::RwLock;
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lexicon file load.
pub const LEXICON_LOAD: &str = "lexicon_load";
/// One complete rewrite call.
pub const QUERY_REWRITE: &str = "query_rewrite";
/// End-to-end time as seen by the caller.
pub const TOTAL: &str = "total";

/// Buckets that retain samples; other names are timed but not kept.
pub const KNOWN_BUCKETS: &[&str] = &[LEXICON_LOAD, QUERY_REWRITE, TOTAL];

/// Summary of one bucket. All times in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub operation: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-bucket statistics, `None` for buckets without samples.
pub type PerformanceReport = IndexMap<String, Option<LatencyStats>>;

#[derive(Debug)]
pub struct PerformanceMonitor {
    measurements: RwLock<IndexMap<String, Vec<f64>>>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        let measurements = KNOWN_BUCKETS
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self {
            measurements: RwLock::new(measurements),
        }
    }

    /// Time one invocation of `operation`, returning its result and the
    /// elapsed milliseconds. The sample is retained only for known buckets.
    pub fn measure<T, F>(&self, name: &str, operation: F) -> (T, f64)
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = operation();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.record(name, latency_ms);
        (result, latency_ms)
    }

    /// Append a sample to a known bucket. Unknown names are ignored.
    pub fn record(&self, name: &str, latency_ms: f64) {
        let Ok(mut measurements) = self.measurements.write() else {
            log::warn!("Performance monitor lock poisoned, dropping {name} sample");
            return;
        };
        match measurements.get_mut(name) {
            Some(bucket) => bucket.push(latency_ms),
            None => log::trace!("Ignoring sample for unknown bucket {name:?}"),
        }
    }

    /// Statistics for one bucket; `None` if it is unknown or empty.
    pub fn statistics(&self, name: &str) -> Option<LatencyStats> {
        let measurements = self.measurements.read().ok()?;
        let data = measurements.get(name)?;
        summarize(name, data)
    }

    /// Statistics for every bucket, in registration order.
    pub fn report(&self) -> PerformanceReport {
        let Ok(measurements) = self.measurements.read() else {
            return PerformanceReport::new();
        };
        measurements
            .iter()
            .map(|(name, data)| (name.clone(), summarize(name, data)))
            .collect()
    }

    /// Number of samples held for a bucket.
    pub fn sample_count(&self, name: &str) -> usize {
        self.measurements
            .read()
            .ok()
            .and_then(|m| m.get(name).map(Vec::len))
            .unwrap_or(0)
    }

    /// Drop all samples, keeping the buckets.
    pub fn reset(&self) {
        if let Ok(mut measurements) = self.measurements.write() {
            for bucket in measurements.values_mut() {
                bucket.clear();
            }
        }
    }

    /// Fixed-width text report of every non-empty bucket.
    pub fn format_report(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "PERFORMANCE REPORT");
        let _ = writeln!(out, "{rule}");

        for stats in self.report().into_values().flatten() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}:", stats.operation.to_uppercase().replace('_', " "));
            let _ = writeln!(out, "  Samples:  {}", stats.count);
            let _ = writeln!(out, "  Mean:     {:.2}ms", stats.mean);
            let _ = writeln!(out, "  Median:   {:.2}ms", stats.median);
            let _ = writeln!(out, "  p95:      {:.2}ms", stats.p95);
            let _ = writeln!(out, "  p99:      {:.2}ms", stats.p99);
            let _ = writeln!(out, "  Min:      {:.2}ms", stats.min);
            let _ = writeln!(out, "  Max:      {:.2}ms", stats.max);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{rule}");
        out
    }
}

fn summarize(name: &str, data: &[f64]) -> Option<LatencyStats> {
    if data.is_empty() {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(LatencyStats {
        operation: name.to_string(),
        count,
        mean,
        median: median(&sorted),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
        min: sorted[0],
        max: sorted[count - 1],
    })
}

/// Median of ascending-sorted data; mean of the middle pair for even counts.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Nearest-rank percentile of ascending-sorted data: the value at
/// `floor(n * p / 100)`, clamped to the last index. No interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (sorted.len() as f64 * p / 100.0).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn twenty() -> Vec<f64> {
        (1..=20).map(|i| (i * 5) as f64).collect()
    }

    #[rstest]
    #[case(95.0, 100.0)]
    #[case(99.0, 100.0)]
    #[case(50.0, 55.0)]
    #[case(0.0, 5.0)]
    #[case(100.0, 100.0)]
    fn test_percentile_nearest_rank(#[case] p: f64, #[case] expected: f64) {
        assert_eq!(percentile(&twenty(), p), expected);
    }

    #[test]
    fn test_statistics_for_bucket() {
        let monitor = PerformanceMonitor::new();
        for v in twenty() {
            monitor.record(QUERY_REWRITE, v);
        }
        let stats = monitor.statistics(QUERY_REWRITE).unwrap();
        assert_eq!(stats.count, 20);
        assert_eq!(stats.mean, 52.5);
        assert_eq!(stats.median, 52.5);
        assert_eq!(stats.p95, 100.0);
        assert_eq!(stats.p99, 100.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 100.0);
    }

    #[test]
    fn test_unknown_bucket_measured_not_retained() {
        let monitor = PerformanceMonitor::new();
        let (value, latency) = monitor.measure("warmup", || 41 + 1);
        assert_eq!(value, 42);
        assert!(latency >= 0.0);
        assert_eq!(monitor.sample_count("warmup"), 0);
        assert!(monitor.statistics("warmup").is_none());
        assert!(!monitor.report().contains_key("warmup"));
    }

    #[test]
    fn test_measure_known_bucket() {
        let monitor = PerformanceMonitor::new();
        let (_, _) = monitor.measure(LEXICON_LOAD, || ());
        assert_eq!(monitor.sample_count(LEXICON_LOAD), 1);
    }

    #[test]
    fn test_empty_buckets_report_none() {
        let monitor = PerformanceMonitor::new();
        let report = monitor.report();
        assert_eq!(report.len(), 3);
        assert!(report.values().all(Option::is_none));
        assert!(monitor.statistics(TOTAL).is_none());
    }

    #[test]
    fn test_reset_and_format() {
        let monitor = PerformanceMonitor::new();
        monitor.record(TOTAL, 3.0);
        let text = monitor.format_report();
        assert!(text.contains("PERFORMANCE REPORT"));
        assert!(text.contains("TOTAL:"));
        assert!(text.contains("Mean:     3.00ms"));
        assert!(!text.contains("QUERY REWRITE"));

        monitor.reset();
        assert_eq!(monitor.sample_count(TOTAL), 0);
    }
}
