//! Decode failures.

use gribjump_core::{EngineError, ShapeMismatchError};
use thiserror::Error;

/// Failure while materializing or reshaping one result.
///
/// Fatal to the result it came from, never to the iterator that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Loading a buffer from the engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A loaded buffer does not match the request shape.
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),
}
