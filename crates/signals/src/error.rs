use thiserror::Error;

/// Why a signal source could not produce a value.
///
/// Never surfaces past the collector: each variant is folded into the
/// matching [`Probed`](crate::Probed) sentinel before it reaches a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The probe ran but could not produce a value here and now.
    #[error("signal unavailable: {0}")]
    Unavailable(String),
    /// The environment lacks the capability entirely.
    #[error("signal unsupported in this environment")]
    Unsupported,
}

impl ProbeError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ProbeError::Unavailable(reason.into())
    }
}

/// Errors raised by a [`SaltStore`](crate::SaltStore) backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage medium could not be read or written.
    #[error("storage io error: {0}")]
    Io(String),
    /// The backend refuses access (disabled, sandboxed, poisoned).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(err: impl std::fmt::Display) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<StorageError> for ProbeError {
    fn from(err: StorageError) -> Self {
        ProbeError::Unavailable(err.to_string())
    }
}
