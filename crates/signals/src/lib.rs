//! Environment signal layer for device fingerprints.
//!
//! Heterogeneous, partially available probes go in; one fixed-shape
//! [`ComponentRecord`] comes out.
//!
//! ## What we do
//!
//! - Define the record shape shared by the fingerprint builder and the
//!   comparator ([`ComponentRecord`], [`Fingerprint`])
//! - Put every probe behind one async seam ([`SignalSource`]) so hosts inject
//!   their own set and tests inject fakes
//! - Keep a per-scope storage salt ([`SaltStore`], [`StorageSalt`])
//! - Apply the private-mode quota policy ([`detect_private_mode`])
//! - Run the whole set and fold failures into sentinels ([`Collector`])
//!
//! ## Invariants worth knowing
//!
//! - A probe error never escapes [`Collector::collect`]; it becomes
//!   `"unavailable"` or `"unsupported"` in the record
//! - The record's key set and nesting are the same in every environment
//! - The salt is reused within a scope; a broken scope yields `"unavailable"`
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use signals::{Collector, CollectorConfig, InMemorySaltStore, Probed, SignalSet};
//!
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime");
//! let set = SignalSet::headless_with_store(
//!     &CollectorConfig::default(),
//!     Arc::new(InMemorySaltStore::new()),
//! );
//! let record = rt.block_on(Collector::new(set).collect());
//! assert_eq!(record.audio_hash, Probed::Unsupported);
//! ```

mod collector;
mod config;
mod error;
mod headless;
mod private_mode;
mod source;
mod storage;
mod types;

pub use crate::collector::Collector;
pub use crate::config::CollectorConfig;
pub use crate::error::{ProbeError, StorageError};
pub use crate::headless::{
    device_memory_bucket, host_user_agent, parse_meminfo_total, posix_locale_to_bcp47,
    EnvLocale, SystemDeviceInfo, Unsupported,
};
pub use crate::private_mode::{
    detect_private_mode, HostStorageEnvironment, PrivateMode, StorageEnvironment,
    DEFAULT_PRIVATE_QUOTA_THRESHOLD,
};
pub use crate::source::{
    run_blocking, DeviceSource, DigestedSignal, FixedSignal, FlagSource, HashSource, LocaleSource,
    SignalSet, SignalSource,
};
pub use crate::storage::{
    generate_salt, FileSaltStore, InMemorySaltStore, SaltStore, StorageSalt, DEFAULT_SALT_KEY,
};
pub use crate::types::{
    ComponentRecord, DeviceInfo, Fingerprint, LocaleInfo, Probed, UNAVAILABLE, UNSUPPORTED,
};

pub use async_trait::async_trait;
