//! Error types for the extraction protocol.
//!
//! Three failure families, by where they are detected:
//! - [`InvalidRangeError`]: caller input rejected locally, before any
//!   engine call.
//! - [`EngineError`]: the engine reported a non-success status.
//! - [`ShapeMismatchError`]: a returned buffer does not match the shape of
//!   the request it answers (protocol desynchronization).

use std::fmt;

use thiserror::Error;

use crate::status::EngineStatus;

/// Caller input that cannot describe a valid set of ranges.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidRangeError {
    /// No ranges were supplied.
    #[error("at least one range is required")]
    Empty,
    /// A range with `lo >= hi`.
    #[error("invalid range {index} [{lo}, {hi}): expected lo < hi")]
    Inverted {
        /// Position of the offending range in the input.
        index: usize,
        /// Lower bound.
        lo: usize,
        /// Upper bound.
        hi: usize,
    },
    /// A mask with no `true` positions.
    #[error("mask must contain at least one set position")]
    EmptyMask,
    /// A point index whose unit range cannot be represented.
    #[error("point {index} at position {position} overflows the index type")]
    Overflow {
        /// Position of the offending point in the input.
        index: usize,
        /// The point value.
        position: usize,
    },
    /// Range lengths whose sum cannot be represented.
    #[error("ranges cover more than usize::MAX positions (overflow at range {index})")]
    TotalOverflow {
        /// Position of the range whose length overflowed the running total.
        index: usize,
    },
    /// A compact range string could not be parsed.
    #[error("malformed range string '{input}': {reason}")]
    Malformed {
        /// The offending fragment.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// A non-success status reported by the extraction engine.
///
/// The code and message are carried exactly as the engine reported them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("engine call '{operation}' failed with status {code}: {message}")]
pub struct EngineError {
    /// Name of the engine operation that failed.
    pub operation: String,
    /// Raw status code reported by the engine.
    pub code: i32,
    /// Engine-supplied description.
    pub message: String,
}

impl EngineError {
    /// Build an error from a known status.
    pub fn new(operation: impl Into<String>, status: EngineStatus, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            code: status.code(),
            message: message.into(),
        }
    }

    /// Build an error from a raw status code.
    pub fn from_code(operation: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// The status as a known [`EngineStatus`], if the code is one.
    pub fn status(&self) -> Option<EngineStatus> {
        EngineStatus::from_code(self.code)
    }
}

/// Which of the two flat buffers a [`ShapeMismatchError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// The flat `f64` value buffer.
    Values,
    /// The flat packed `u64` mask buffer.
    Mask,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values => write!(f, "values"),
            Self::Mask => write!(f, "mask"),
        }
    }
}

/// A decoded buffer whose length disagrees with the request shape.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{buffer} buffer holds {actual} elements, request shape expects {expected}")]
pub struct ShapeMismatchError {
    /// The buffer that was the wrong size.
    pub buffer: BufferKind,
    /// Element count implied by the request shape.
    pub expected: usize,
    /// Element count actually received.
    pub actual: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_message_names_bounds() {
        let err = InvalidRangeError::Inverted {
            index: 2,
            lo: 7,
            hi: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid range 2 [7, 3): expected lo < hi"
        );
    }

    #[test]
    fn engine_error_keeps_unknown_codes() {
        let err = EngineError::from_code("extract", -42, "disk on fire");
        assert_eq!(err.code, -42);
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "engine call 'extract' failed with status -42: disk on fire"
        );
    }

    #[test]
    fn engine_error_from_status() {
        let err = EngineError::new("axes", EngineStatus::NotFound, "no match");
        assert_eq!(err.status(), Some(EngineStatus::NotFound));
    }

    #[test]
    fn shape_mismatch_message() {
        let err = ShapeMismatchError {
            buffer: BufferKind::Mask,
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "mask buffer holds 2 elements, request shape expects 3"
        );
    }
}
