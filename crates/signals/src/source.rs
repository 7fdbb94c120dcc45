//! The signal source seam.
//!
//! Every environmental probe sits behind [`SignalSource`]. Sources report
//! failure as a [`ProbeError`]; the collector is the single place where those
//! errors become sentinels, so a source never needs to know about records.

use std::sync::Arc;

use async_trait::async_trait;
use canonical::{digest_bytes_with, DigestAlgorithm};

use crate::error::ProbeError;
use crate::types::{DeviceInfo, LocaleInfo};

/// One environmental probe.
#[async_trait]
pub trait SignalSource: Send + Sync {
    type Output: Send;

    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    async fn probe(&self) -> Result<Self::Output, ProbeError>;
}

/// Run a synchronous probe body on the blocking pool.
///
/// For sources that touch the filesystem. A panicking or cancelled body
/// reports the signal unavailable.
pub async fn run_blocking<T, F>(body: F) -> Result<T, ProbeError>
where
    F: FnOnce() -> Result<T, ProbeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(body)
        .await
        .map_err(|err| ProbeError::unavailable(err.to_string()))?
}

pub type HashSource = Arc<dyn SignalSource<Output = String>>;
pub type FlagSource = Arc<dyn SignalSource<Output = bool>>;
pub type DeviceSource = Arc<dyn SignalSource<Output = DeviceInfo>>;
pub type LocaleSource = Arc<dyn SignalSource<Output = LocaleInfo>>;

/// The injected set of probes a [`Collector`](crate::Collector) runs.
#[derive(Clone)]
pub struct SignalSet {
    pub audio: HashSource,
    pub drm: HashSource,
    pub canvas: HashSource,
    pub storage_salt: HashSource,
    pub private_mode: FlagSource,
    pub device_info: DeviceSource,
    pub locale_info: LocaleSource,
}

impl std::fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSet")
            .field("audio", &self.audio.name())
            .field("drm", &self.drm.name())
            .field("canvas", &self.canvas.name())
            .field("storage_salt", &self.storage_salt.name())
            .field("private_mode", &self.private_mode.name())
            .field("device_info", &self.device_info.name())
            .field("locale_info", &self.locale_info.name())
            .finish()
    }
}

/// A source that always answers the same thing.
///
/// Used as a deterministic fake in tests and by hosts that receive signal
/// values from somewhere else (a client payload, a replay file).
#[derive(Debug, Clone)]
pub struct FixedSignal<T> {
    name: &'static str,
    outcome: Result<T, ProbeError>,
}

impl<T> FixedSignal<T> {
    pub fn value(name: &'static str, value: T) -> Self {
        Self {
            name,
            outcome: Ok(value),
        }
    }

    pub fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            outcome: Err(ProbeError::unavailable("fixed")),
        }
    }

    pub fn unsupported(name: &'static str) -> Self {
        Self {
            name,
            outcome: Err(ProbeError::Unsupported),
        }
    }
}

#[async_trait]
impl<T> SignalSource for FixedSignal<T>
where
    T: Clone + Send + Sync,
{
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> Result<T, ProbeError> {
        self.outcome.clone()
    }
}

/// Digests the raw render of another source into a hex string.
///
/// The audio, canvas and DRM signals all have this shape: produce a raw
/// buffer, keep only its hash.
pub struct DigestedSignal<S> {
    inner: S,
    algorithm: DigestAlgorithm,
}

impl<S> DigestedSignal<S>
where
    S: SignalSource<Output = Vec<u8>>,
{
    pub fn new(inner: S) -> Self {
        Self::with_algorithm(inner, DigestAlgorithm::Sha256)
    }

    pub fn with_algorithm(inner: S, algorithm: DigestAlgorithm) -> Self {
        Self { inner, algorithm }
    }
}

#[async_trait]
impl<S> SignalSource for DigestedSignal<S>
where
    S: SignalSource<Output = Vec<u8>>,
{
    type Output = String;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn probe(&self) -> Result<String, ProbeError> {
        let raw = self.inner.probe().await?;
        if raw.is_empty() {
            return Err(ProbeError::unavailable("empty render"));
        }
        Ok(digest_bytes_with(self.algorithm, &raw))
    }
}
