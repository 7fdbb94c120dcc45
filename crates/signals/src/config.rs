//! Collector configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::private_mode::DEFAULT_PRIVATE_QUOTA_THRESHOLD;
use crate::storage::DEFAULT_SALT_KEY;

/// Knobs for building the headless [`SignalSet`](crate::SignalSet).
///
/// ```rust
/// use signals::CollectorConfig;
///
/// let cfg = CollectorConfig::default();
/// assert_eq!(cfg.private_quota_threshold, 150_000_000);
/// assert_eq!(cfg.salt_key, "fp_salt");
/// assert!(cfg.salt_path.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Storage quota, in bytes, below which a session counts as private.
    #[serde(default = "CollectorConfig::default_threshold")]
    pub private_quota_threshold: u64,
    /// Key the storage salt lives under.
    #[serde(default = "CollectorConfig::default_salt_key")]
    pub salt_key: String,
    /// File backing the salt scope. `None` keeps the salt in process memory.
    #[serde(default)]
    pub salt_path: Option<PathBuf>,
    /// Known display resolution to report, e.g. `"1920x1080"`.
    #[serde(default)]
    pub screen_res: Option<String>,
}

impl CollectorConfig {
    fn default_threshold() -> u64 {
        DEFAULT_PRIVATE_QUOTA_THRESHOLD
    }

    fn default_salt_key() -> String {
        DEFAULT_SALT_KEY.to_string()
    }

    /// Directory used for the private-mode scratch database.
    pub fn storage_dir(&self) -> PathBuf {
        self.salt_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            private_quota_threshold: Self::default_threshold(),
            salt_key: Self::default_salt_key(),
            salt_path: None,
            screen_res: None,
        }
    }
}
