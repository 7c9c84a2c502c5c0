use std::fmt;
use std::time::Duration;

use telemetry::RunMetrics;

pub const CANDIDATES: &str = "candidates";
pub const LINKED: &str = "linked";
pub const PLANNED: &str = "planned";
pub const UNMATCHED: &str = "unmatched";
pub const AMBIGUOUS: &str = "ambiguous";
pub const FAILED: &str = "failed";

/// What one run did to its candidates.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub candidates: u64,
    pub linked: u64,
    pub planned: u64,
    pub unmatched: u64,
    pub ambiguous: u64,
    pub failed: u64,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_metrics(metrics: &RunMetrics, dry_run: bool) -> Self {
        Self {
            candidates: metrics.get(CANDIDATES),
            linked: metrics.get(LINKED),
            planned: metrics.get(PLANNED),
            unmatched: metrics.get(UNMATCHED),
            ambiguous: metrics.get(AMBIGUOUS),
            failed: metrics.get(FAILED),
            dry_run,
            elapsed: metrics.elapsed(),
        }
    }

    /// Candidates still lacking a cross-reference after this run.
    pub fn left_for_next_run(&self) -> u64 {
        self.candidates.saturating_sub(self.linked)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} linked, {} unmatched, {} ambiguous, {} failed",
            self.candidates, self.linked, self.unmatched, self.ambiguous, self.failed
        )?;
        if self.dry_run {
            write!(f, ", {} planned (dry run)", self.planned)?;
        }
        write!(f, " in {:.1?}", self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_metrics() {
        let mut metrics = RunMetrics::new();
        metrics.record_counter(CANDIDATES, 4);
        metrics.incr(LINKED);
        metrics.incr(LINKED);
        metrics.incr(UNMATCHED);
        metrics.incr(FAILED);

        let summary = RunSummary::from_metrics(&metrics, false);
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.linked, 2);
        assert_eq!(summary.ambiguous, 0);
        assert_eq!(summary.left_for_next_run(), 2);

        let rendered = summary.to_string();
        assert!(rendered.starts_with("4 candidates: 2 linked, 1 unmatched, 0 ambiguous, 1 failed"));
        assert!(!rendered.contains("dry run"));
    }
}
