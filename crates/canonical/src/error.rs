use thiserror::Error;

/// Errors raised while configuring the canonical layer.
///
/// Canonicalization and hashing themselves are infallible; only parsing a
/// configured primitive name can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}
