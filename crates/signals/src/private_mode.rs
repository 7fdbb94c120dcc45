//! Best-effort private-browsing detection.
//!
//! Private sessions usually either refuse to open a database at all or
//! hand out a much smaller storage quota. The policy:
//!
//! 1. test database cannot be opened -> private
//! 2. quota estimate below the threshold -> private
//! 3. no way to estimate the quota -> not private
//! 4. estimation fails outright -> private

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::ProbeError;
use crate::source::{run_blocking, SignalSource};

/// Quota below which a session is considered private, in bytes.
pub const DEFAULT_PRIVATE_QUOTA_THRESHOLD: u64 = 150_000_000;

/// The storage primitives the policy needs from its host.
pub trait StorageEnvironment: Send + Sync {
    /// Try to open (and discard) a throwaway database.
    fn open_test_database(&self) -> Result<(), ProbeError>;

    /// Available storage quota in bytes; `Ok(None)` when the host has no
    /// estimation API.
    fn estimate_quota(&self) -> Result<Option<u64>, ProbeError>;
}

/// Apply the private-mode policy to `env`.
pub fn detect_private_mode(env: &dyn StorageEnvironment, threshold: u64) -> bool {
    if let Err(err) = env.open_test_database() {
        debug!(error = %err, "private_mode_open_failed");
        return true;
    }
    match env.estimate_quota() {
        Ok(Some(quota)) => quota < threshold,
        Ok(None) => false,
        Err(err) => {
            debug!(error = %err, "private_mode_estimate_failed");
            true
        }
    }
}

/// Host filesystem as the storage environment.
///
/// The "database" is a scratch file created and removed in `dir`; the quota
/// is the free space of the filesystem holding `dir`.
#[derive(Debug, Clone)]
pub struct HostStorageEnvironment {
    dir: PathBuf,
}

impl HostStorageEnvironment {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for HostStorageEnvironment {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl StorageEnvironment for HostStorageEnvironment {
    fn open_test_database(&self) -> Result<(), ProbeError> {
        fs::create_dir_all(&self.dir).map_err(|e| ProbeError::unavailable(e.to_string()))?;
        let probe = self
            .dir
            .join(format!(".devfp-probe-{}", Uuid::new_v4().simple()));
        fs::write(&probe, b"devfp").map_err(|e| ProbeError::unavailable(e.to_string()))?;
        fs::remove_file(&probe).map_err(|e| ProbeError::unavailable(e.to_string()))
    }

    fn estimate_quota(&self) -> Result<Option<u64>, ProbeError> {
        free_bytes(&self.dir)
    }
}

#[cfg(unix)]
fn free_bytes(dir: &std::path::Path) -> Result<Option<u64>, ProbeError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|e| ProbeError::unavailable(e.to_string()))?;
    // SAFETY: `statvfs` is plain old data and fully written by the call on success.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(ProbeError::unavailable(
            std::io::Error::last_os_error().to_string(),
        ));
    }
    #[allow(clippy::unnecessary_cast)]
    let bytes = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
    Ok(Some(bytes))
}

#[cfg(not(unix))]
fn free_bytes(_dir: &std::path::Path) -> Result<Option<u64>, ProbeError> {
    Ok(None)
}

/// Signal source wrapping the policy. Never fails.
#[derive(Clone)]
pub struct PrivateMode {
    env: Arc<dyn StorageEnvironment>,
    threshold: u64,
}

impl PrivateMode {
    pub fn new(env: Arc<dyn StorageEnvironment>) -> Self {
        Self::with_threshold(env, DEFAULT_PRIVATE_QUOTA_THRESHOLD)
    }

    pub fn with_threshold(env: Arc<dyn StorageEnvironment>, threshold: u64) -> Self {
        Self { env, threshold }
    }
}

#[async_trait]
impl SignalSource for PrivateMode {
    type Output = bool;

    fn name(&self) -> &'static str {
        "private_mode"
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        let this = self.clone();
        run_blocking(move || Ok(detect_private_mode(this.env.as_ref(), this.threshold))).await
    }
}
