//! # Device Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` answers one question: how similar are two device fingerprints?
//! Either side may be a typed [`Fingerprint`](signals::Fingerprint), a bare
//! [`ComponentRecord`](signals::ComponentRecord), loosely typed JSON, JSON
//! text, or nothing but an identifier string. Both sides are first reduced
//! by [`normalize`] to a [`Normalized`] shape, then scored.
//!
//! ## Scoring
//!
//! - If either side carries only an identifier, the score is `1.0` when both
//!   identifiers are present and equal and `0.0` otherwise. Components on the
//!   other side are ignored.
//! - Otherwise each entry of the [`FieldWeights`] table is looked up on both
//!   sides and compared for strict equality. Sentinels match sentinels and a
//!   field missing on both sides matches. The score is the matched weight over
//!   the total weight.
//!
//! The default table:
//!
//! | field | weight |
//! |-------|--------|
//! | `audioHash` | 2 |
//! | `drmHash` | 2 |
//! | `canvasHash` | 1 |
//! | `deviceInfo.userAgent` | 2 |
//! | `deviceInfo.screenRes` | 1 |
//! | `deviceInfo.deviceMemory` | 1 |
//! | `deviceInfo.hardwareConcurrency` | 1 |
//! | `localeInfo.timezone` | 1 |
//! | `localeInfo.language` | 1 |
//! | `localeInfo.languages[0]` | 1 |
//!
//! `storageSalt` and `privateFlag` never contribute.
//!
//! ## Example
//!
//! ```rust
//! use matcher::{Comparator, MatchMode};
//! use serde_json::json;
//!
//! let baseline = json!({"audioHash": "a1", "canvasHash": "c1"});
//! let current = r#"{"audioHash": "a1", "canvasHash": "c2"}"#;
//!
//! let report = Comparator::default().explain(baseline, current);
//! assert_eq!(report.mode, MatchMode::Weighted);
//! assert_eq!(report.score, 12.0 / 13.0);
//! ```
//!
//! ## Observability
//!
//! Install a process-wide [`MatchMetrics`] recorder with
//! [`set_match_metrics`], or attach a [`CompareObserver`] to one
//! [`Comparator`] to see each field outcome. Mismatched fields are also
//! logged at `debug` level through `tracing`.

mod engine;
mod metrics;
mod normalize;
mod types;

pub use crate::engine::{compare, Comparator};
pub use crate::metrics::{set_match_metrics, CompareObserver, MatchMetrics};
pub use crate::normalize::normalize;
pub use crate::types::{
    CompareInput, CompareReport, Field, FieldOutcome, FieldWeights, MatchConfig, MatchError,
    MatchMode, Normalized, PathSegment,
};
