//! Result decoding for GribJump extractions.
//!
//! The engine answers each request with two flat buffers: every extracted
//! value as `f64`, and a validity bitmask packed 64 positions per `u64`
//! word, restarting at a word boundary for each range. [`ExtractionResult`]
//! owns the engine's result handle, materializes those buffers lazily, and
//! cuts them back into one array per requested range.
//!
//! Borrowed views ([`ExtractionResult::values`], [`ExtractionResult::masks`])
//! live only as long as the result; the `copy_*` accessors return owned
//! data that may outlive it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// `tracing` target for every event the GribJump crates emit.
pub const LOG_TARGET: &str = "gribjump";

macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::LOG_TARGET, $($field)*)
    };
}
pub(crate) use log_warn;

pub mod bitmask;
pub mod error;
pub mod raw;
pub mod result;

pub use error::DecodeError;
pub use raw::{BufferedResult, RawResult};
pub use result::ExtractionResult;
