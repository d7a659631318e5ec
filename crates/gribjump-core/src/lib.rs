//! Core types for GribJump extraction clients.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! request side of the extraction protocol: half-open index ranges and the
//! mask/index conversions over them, structured request keys, extraction
//! request descriptors, engine status codes, and the error taxonomy shared
//! by every other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod range;
pub mod request;
pub mod status;

pub use error::{BufferKind, EngineError, InvalidRangeError, ShapeMismatchError};
pub use key::{RequestKey, RequestKeyBuilder, SelectorValue};
pub use range::{Range, Shape, BITS_PER_WORD};
pub use request::{ExtractionRequest, FileLocation, PathExtractionRequest, RangeRequest};
pub use status::EngineStatus;
