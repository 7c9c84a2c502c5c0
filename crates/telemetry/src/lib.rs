/*!
# Telemetry

Logging setup and lightweight counters for a single sync run.
*/

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

/// Default filter directive for a given `-v` count.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `verbosity`
/// when set. Calling it twice is a no-op.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Named counters for one run, plus the instant it started.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    counters: BTreeMap<&'static str, u64>,
    started: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    pub fn incr(&mut self, name: &'static str) {
        self.record_counter(name, 1);
    }

    pub fn record_counter(&mut self, name: &'static str, value: u64) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    /// Zero for counters never recorded.
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "counters": self.counters,
            "elapsed_ms": self.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut metrics = RunMetrics::new();
        metrics.incr("linked");
        metrics.incr("linked");
        metrics.record_counter("candidates", 5);

        assert_eq!(metrics.get("linked"), 2);
        assert_eq!(metrics.get("candidates"), 5);
        assert_eq!(metrics.get("failed"), 0);
    }

    #[test]
    fn test_snapshot_shape() {
        let mut metrics = RunMetrics::new();
        metrics.incr("unmatched");
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot["counters"]["unmatched"], 1);
        assert!(snapshot["elapsed_ms"].is_u64());
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "info");
        assert_eq!(default_filter(1), "debug");
        assert_eq!(default_filter(4), "trace");
    }
}
