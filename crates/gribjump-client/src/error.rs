//! Client-level error type.

use gribjump_core::{EngineError, InvalidRangeError};
use gribjump_result::DecodeError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by [`GribJump`](crate::GribJump) operations and by the
/// [`ExtractionIterator`](crate::ExtractionIterator).
#[derive(Debug, Error)]
pub enum GribJumpError {
    /// Caller-supplied ranges, mask, or points were rejected before any
    /// engine call.
    #[error("invalid range: {0}")]
    InvalidRange(#[from] InvalidRangeError),
    /// The engine reported a failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A result could not be decoded.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// An extraction batch contained no requests.
    #[error("extraction batch must contain at least one request")]
    EmptyBatch,
    /// The engine yielded a different number of results than requests were
    /// submitted; positions can no longer be paired with shapes.
    #[error("engine yielded {yielded} results for {expected} requests")]
    ResultCountMismatch {
        /// Number of requests submitted.
        expected: usize,
        /// Number of results seen when the mismatch was detected.
        yielded: usize,
    },
    /// The client configuration is invalid.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// The request context could not be serialized.
    #[error("context serialization failed: {0}")]
    Context(#[from] serde_json::Error),
}
