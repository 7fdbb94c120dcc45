//! Digest primitives for fingerprint identifiers.
//!
//! Two primitives are available:
//!
//! ```text
//! Sha256: SHA-256(text_bytes)  -> 64 hex chars
//! Fx64:   FxHash64(text_bytes) -> 16 hex chars
//! ```
//!
//! Nothing is mixed into the hash beyond the caller's text: no version, no
//! discriminator byte, no salt. Anything that must influence the identifier
//! has to already be part of the canonical text.
//!
//! [`digest`] picks the primitive at call time from the process-wide
//! selection installed with [`set_digest_algorithm`]. SHA-256 is the default;
//! `Fx64` exists for hosts that disable SHA-256 and is not collision
//! resistant.
//!
//! # Examples
//!
//! ```rust
//! use canonical::{digest_with, DigestAlgorithm};
//!
//! let id = digest_with(DigestAlgorithm::Sha256, "{\"a\":1}");
//! assert_eq!(id.len(), 64);
//!
//! let short = digest_with(DigestAlgorithm::Fx64, "{\"a\":1}");
//! assert_eq!(short.len(), 16);
//! ```

use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;
use std::sync::RwLock;

use fxhash::FxHasher64;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CanonicalError;

/// Hash primitive used to turn canonical text into an identifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, hex encoded.
    #[default]
    Sha256,
    /// 64-bit FxHash, hex encoded. Fast, non-cryptographic.
    Fx64,
}

impl DigestAlgorithm {
    /// Length in hex characters of every digest produced by this primitive.
    pub const fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Fx64 => 16,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Fx64 => "fx64",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "fx64" | "fxhash" => Ok(DigestAlgorithm::Fx64),
            other => Err(CanonicalError::UnknownAlgorithm(other.to_string())),
        }
    }
}

fn algorithm_lock() -> &'static RwLock<DigestAlgorithm> {
    static ALGORITHM: OnceCell<RwLock<DigestAlgorithm>> = OnceCell::new();
    ALGORITHM.get_or_init(|| RwLock::new(DigestAlgorithm::default()))
}

/// Install the primitive that [`digest`] uses from now on.
pub fn set_digest_algorithm(algorithm: DigestAlgorithm) {
    let mut guard = algorithm_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = algorithm;
}

/// The primitive [`digest`] would use if called right now.
pub fn current_digest_algorithm() -> DigestAlgorithm {
    *algorithm_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hash `text` with the currently selected primitive and return a hex digest.
///
/// Deterministic for a given primitive, and the output length never depends
/// on the input length.
pub fn digest(text: &str) -> String {
    digest_with(current_digest_algorithm(), text)
}

/// Hash `text` with an explicit primitive.
pub fn digest_with(algorithm: DigestAlgorithm, text: &str) -> String {
    digest_bytes_with(algorithm, text.as_bytes())
}

/// Hash raw bytes with an explicit primitive.
///
/// Used by probes that digest a raw render (audio buffer, canvas pixels)
/// before it enters the component record.
pub fn digest_bytes_with(algorithm: DigestAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            hex::encode(hasher.finalize())
        }
        DigestAlgorithm::Fx64 => {
            let mut hasher = FxHasher64::default();
            hasher.write(bytes);
            format!("{:016x}", hasher.finish())
        }
    }
}
