// Instrumentation hooks for comparisons.
//
// A process-wide `MatchMetrics` recorder receives one event per comparison.
// A `CompareObserver` is attached to a single `Comparator` and sees every
// field outcome as it is scored.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::{CompareReport, FieldOutcome, MatchMode};

/// Metrics observer for comparisons.
pub trait MatchMetrics: Send + Sync {
    /// Record one comparison: the scoring branch taken, wall-clock latency
    /// and the final score.
    fn record_compare(&self, mode: MatchMode, latency: Duration, score: f64);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global comparison metrics recorder.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

/// Per-comparator hook, called synchronously while scoring.
pub trait CompareObserver: Send + Sync {
    fn on_field(&self, outcome: &FieldOutcome);

    fn on_complete(&self, _report: &CompareReport) {}
}
