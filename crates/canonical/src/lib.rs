//! Canonical text and digest layer for device fingerprints.
//!
//! Turns a structured component record into one fixed textual form and
//! hashes that text into an opaque hex identifier.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no randomness. The same `serde_json::Value` and
//! the same [`DigestAlgorithm`] give the same identifier on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Canonical text sorts object keys recursively; arrays keep their order
//! - Identifier = digest(canonical text), nothing else mixed in
//! - Output length is fixed per primitive (64 hex for SHA-256, 16 for Fx64)

mod error;
mod hash;
mod json;

pub use crate::error::CanonicalError;
pub use crate::hash::{
    current_digest_algorithm, digest, digest_bytes_with, digest_with, set_digest_algorithm,
    DigestAlgorithm,
};
pub use crate::json::canonical_json;

/// Canonicalize `value` and digest it with an explicit primitive.
pub fn identify(value: &serde_json::Value, algorithm: DigestAlgorithm) -> String {
    digest_with(algorithm, &canonical_json(value))
}
