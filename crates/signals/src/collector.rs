//! Component collection.
//!
//! Runs the injected probes and assembles one [`ComponentRecord`]. The
//! render-backed probes (audio, DRM, canvas) are polled together on the
//! calling task; the remaining probes run after them. Nothing here can fail:
//! every probe error becomes a sentinel before it reaches the record.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn, Instrument, Level};

use crate::config::CollectorConfig;
use crate::error::ProbeError;
use crate::headless::{EnvLocale, SystemDeviceInfo, Unsupported};
use crate::private_mode::{HostStorageEnvironment, PrivateMode};
use crate::source::{SignalSet, SignalSource};
use crate::storage::{FileSaltStore, InMemorySaltStore, SaltStore, StorageSalt};
use crate::types::{ComponentRecord, Probed};

impl SignalSet {
    /// Probes for a host without a browser.
    ///
    /// The salt scope is the file at `cfg.salt_path`, or a fresh in-memory
    /// scope when no path is configured.
    pub fn headless(cfg: &CollectorConfig) -> Self {
        let store: Arc<dyn SaltStore> = match &cfg.salt_path {
            Some(path) => Arc::new(FileSaltStore::new(path)),
            None => Arc::new(InMemorySaltStore::new()),
        };
        Self::headless_with_store(cfg, store)
    }

    /// Like [`SignalSet::headless`] but with an explicit salt scope.
    pub fn headless_with_store(cfg: &CollectorConfig, store: Arc<dyn SaltStore>) -> Self {
        let mut device = SystemDeviceInfo::new();
        if let Some(res) = &cfg.screen_res {
            device = device.with_screen_res(res.clone());
        }
        Self {
            audio: Arc::new(Unsupported::audio()),
            drm: Arc::new(Unsupported::drm()),
            canvas: Arc::new(Unsupported::canvas()),
            storage_salt: Arc::new(StorageSalt::with_key(store, cfg.salt_key.clone())),
            private_mode: Arc::new(PrivateMode::with_threshold(
                Arc::new(HostStorageEnvironment::new(cfg.storage_dir())),
                cfg.private_quota_threshold,
            )),
            device_info: Arc::new(device),
            locale_info: Arc::new(EnvLocale::new()),
        }
    }
}

/// Orchestrates a [`SignalSet`] into component records.
#[derive(Debug, Clone)]
pub struct Collector {
    signals: SignalSet,
}

impl Collector {
    pub fn new(signals: SignalSet) -> Self {
        Self { signals }
    }

    pub fn headless(cfg: &CollectorConfig) -> Self {
        Self::new(SignalSet::headless(cfg))
    }

    pub fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// Run every probe once and assemble the record.
    pub async fn collect(&self) -> ComponentRecord {
        let span = tracing::span!(Level::DEBUG, "signals.collect");
        self.collect_inner().instrument(span).await
    }

    async fn collect_inner(&self) -> ComponentRecord {
        let start = Instant::now();
        let s = &self.signals;
        let (audio, drm, canvas) = tokio::join!(s.audio.probe(), s.drm.probe(), s.canvas.probe());
        let audio_hash = absorb(s.audio.name(), audio);
        let drm_hash = absorb(s.drm.name(), drm);
        let canvas_hash = absorb(s.canvas.name(), canvas);

        let storage_salt = absorb(s.storage_salt.name(), s.storage_salt.probe().await);

        // Any failure while checking counts as private.
        let private_flag = match s.private_mode.probe().await {
            Ok(flag) => flag,
            Err(err) => {
                warn!(signal = s.private_mode.name(), error = %err, "signal_absorbed");
                true
            }
        };

        let device_info = match absorb(s.device_info.name(), s.device_info.probe().await) {
            Probed::Value(info) => info,
            _ => Default::default(),
        };
        let locale_info = match absorb(s.locale_info.name(), s.locale_info.probe().await) {
            Probed::Value(info) => info,
            _ => Default::default(),
        };

        let record = ComponentRecord {
            audio_hash,
            drm_hash,
            canvas_hash,
            storage_salt,
            private_flag,
            device_info,
            locale_info,
        };

        info!(
            sentinels = record.sentinel_count(),
            private_flag = record.private_flag,
            elapsed_micros = start.elapsed().as_micros(),
            "collect_complete"
        );
        record
    }
}

/// Turn a probe outcome into a record value, logging what was lost.
fn absorb<T>(name: &'static str, outcome: Result<T, ProbeError>) -> Probed<T> {
    match &outcome {
        Err(ProbeError::Unavailable(reason)) => {
            warn!(signal = name, reason = %reason, "signal_absorbed");
        }
        Err(ProbeError::Unsupported) => {
            debug!(signal = name, "signal_unsupported");
        }
        Ok(_) => {}
    }
    outcome.into()
}
