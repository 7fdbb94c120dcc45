use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::metrics::{metrics_recorder, CompareObserver};
use crate::normalize::normalize;
use crate::types::{
    CompareInput, CompareReport, Field, FieldOutcome, MatchConfig, MatchError, MatchMode,
    Normalized,
};


/// Scores the similarity of two fingerprints, records or identifiers.
///
/// A comparator holds no state between calls; one instance can be shared
/// freely across threads.
#[derive(Clone, Default)]
pub struct Comparator {
    config: MatchConfig,
    observer: Option<Arc<dyn CompareObserver>>,
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Comparator {
    /// Build a comparator, rejecting weight tables that sum to zero.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            config,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CompareObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Score in `[0, 1]`.
    pub fn compare(&self, left: impl Into<CompareInput>, right: impl Into<CompareInput>) -> f64 {
        self.explain(left, right).score
    }

    /// Score plus the per-field breakdown that produced it.
    pub fn explain(
        &self,
        left: impl Into<CompareInput>,
        right: impl Into<CompareInput>,
    ) -> CompareReport {
        let start = Instant::now();
        let left = normalize(left);
        let right = normalize(right);

        let report = match (&left, &right) {
            (
                Normalized::Record {
                    components: l, ..
                },
                Normalized::Record {
                    components: r, ..
                },
            ) => self.weighted(l, r),
            _ => identifier_report(left.identifier(), right.identifier()),
        };

        if let Some(observer) = &self.observer {
            observer.on_complete(&report);
        }
        let latency = start.elapsed();
        if let Some(recorder) = metrics_recorder() {
            recorder.record_compare(report.mode, latency, report.score);
        }
        debug!(
            mode = report.mode.as_str(),
            score = report.score,
            matched_weight = report.matched_weight,
            total_weight = report.total_weight,
            latency_micros = latency.as_micros(),
            "compare_complete"
        );
        report
    }

    fn weighted(&self, left: &Value, right: &Value) -> CompareReport {
        if !left.is_object() || !right.is_object() {
            debug!("compare_non_object_components");
            return CompareReport {
                score: 0.0,
                mode: MatchMode::Invalid,
                matched_weight: 0,
                total_weight: 0,
                fields: Vec::new(),
            };
        }

        let mut matched_weight = 0u64;
        let mut total_weight = 0u64;
        let mut fields = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let weight = self.config.weights.weight(field);
            let l = field.lookup(left);
            let r = field.lookup(right);
            let matched = values_equal(l, r);

            total_weight += u64::from(weight);
            if matched {
                matched_weight += u64::from(weight);
            } else {
                debug!(field = field.name(), left = ?l, right = ?r, "field_mismatch");
            }

            let outcome = FieldOutcome {
                field,
                weight,
                matched,
                left: l.cloned(),
                right: r.cloned(),
            };
            if let Some(observer) = &self.observer {
                observer.on_field(&outcome);
            }
            fields.push(outcome);
        }

        let score = if total_weight == 0 {
            0.0
        } else {
            matched_weight as f64 / total_weight as f64
        };
        CompareReport {
            score,
            mode: MatchMode::Weighted,
            matched_weight,
            total_weight,
            fields,
        }
    }
}

fn identifier_report(left: Option<&str>, right: Option<&str>) -> CompareReport {
    let matched = match (left, right) {
        (Some(l), Some(r)) => !l.is_empty() && l == r,
        _ => false,
    };
    CompareReport {
        score: if matched { 1.0 } else { 0.0 },
        mode: MatchMode::Identifier,
        matched_weight: u64::from(matched),
        total_weight: 1,
        fields: Vec::new(),
    }
}

/// Strict equality on looked-up values. Two missing values are equal;
/// numbers compare by value so `8` and `8.0` match.
pub(crate) fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(l)), Some(Value::Number(r))) => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => l == r,
        },
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Compare with the default weight table.
///
/// ```rust
/// use matcher::compare;
///
/// assert_eq!(compare("abc", "abc"), 1.0);
/// assert_eq!(compare("abc", "abd"), 0.0);
/// ```
pub fn compare(left: impl Into<CompareInput>, right: impl Into<CompareInput>) -> f64 {
    Comparator::default().compare(left, right)
}
