//! Workspace umbrella crate for devfp device fingerprinting.
//!
//! Stitches the signal collector, the canonical digest layer and the
//! comparator behind two entry points:
//!
//! - [`generate`]: collect the component record and derive its identifier
//! - [`compare`]: score the similarity of two fingerprints, records or ids
//!
//! The builder half (this crate) and the comparator half (`matcher`) only
//! share the [`ComponentRecord`] shape.
//!
//! ```rust
//! use devfp::{build_fingerprint, compare, ComponentRecord, DigestAlgorithm};
//!
//! let fp = build_fingerprint(ComponentRecord::default(), DigestAlgorithm::Sha256);
//! assert_eq!(fp.identifier.len(), 64);
//! assert_eq!(compare(&fp, &fp), 1.0);
//! assert_eq!(compare(&fp, fp.identifier.as_str()), 1.0);
//! ```

pub mod config;

pub use canonical::{
    CanonicalError, DigestAlgorithm, canonical_json, current_digest_algorithm, digest,
    digest_with, identify, set_digest_algorithm,
};
pub use config::{ConfigLoadError, DevfpConfig, DigestYamlConfig};
pub use matcher::{
    CompareInput, CompareObserver, CompareReport, Comparator, Field, FieldOutcome, FieldWeights,
    MatchConfig, MatchError, MatchMetrics, MatchMode, Normalized, compare, normalize,
    set_match_metrics,
};
pub use signals::{
    Collector, CollectorConfig, ComponentRecord, DeviceInfo, Fingerprint, FixedSignal,
    LocaleInfo, ProbeError, Probed, SaltStore, SignalSet, SignalSource,
};

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use tracing::{Instrument, Level, debug};

/// Metrics observer for the generation pipeline.
pub trait PipelineMetrics: Send + Sync {
    /// Component collection finished; `sentinels` counts probed fields that
    /// ended up `unavailable` or `unsupported`.
    fn record_collect(&self, latency: Duration, sentinels: usize);
    fn record_digest(&self, latency: Duration, algorithm: DigestAlgorithm);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_collect(self, record: &ComponentRecord) {
        self.recorder
            .record_collect(self.start.elapsed(), record.sentinel_count());
    }

    fn record_digest(self, algorithm: DigestAlgorithm) {
        self.recorder
            .record_digest(self.start.elapsed(), algorithm);
    }
}

/// Derive the identifier of `components` and pair the two.
///
/// The identifier is the digest of the canonical JSON text of the record,
/// so equal records always share an identifier and any changed value,
/// including a sentinel substitution, changes it.
pub fn build_fingerprint(components: ComponentRecord, algorithm: DigestAlgorithm) -> Fingerprint {
    let span = MetricsSpan::start();
    let identifier = identify(&components.to_value(), algorithm);
    if let Some(span) = span {
        span.record_digest(algorithm);
    }
    debug!(algorithm = %algorithm, identifier = %identifier, "fingerprint_built");
    Fingerprint {
        identifier,
        components,
    }
}

/// Collect with `collector` and build a fingerprint using the process-wide
/// digest selection.
pub async fn generate_with(collector: &Collector) -> Fingerprint {
    generate_with_algorithm(collector, current_digest_algorithm()).await
}

/// Collect with `collector` and build a fingerprint with an explicit
/// digest primitive.
pub async fn generate_with_algorithm(
    collector: &Collector,
    algorithm: DigestAlgorithm,
) -> Fingerprint {
    let span = tracing::span!(Level::INFO, "devfp.generate", algorithm = %algorithm);
    async move {
        let metrics = MetricsSpan::start();
        let components = collector.collect().await;
        if let Some(metrics) = metrics {
            metrics.record_collect(&components);
        }
        build_fingerprint(components, algorithm)
    }
    .instrument(span)
    .await
}

/// Generate a fingerprint for this host with the default headless probes.
///
/// The collector is created on first use and shared for the life of the
/// process, so the storage salt stays stable between calls.
pub async fn generate() -> Fingerprint {
    generate_with(default_collector()).await
}

fn default_collector() -> &'static Collector {
    static COLLECTOR: OnceCell<Collector> = OnceCell::new();
    COLLECTOR.get_or_init(|| Collector::headless(&CollectorConfig::default()))
}
