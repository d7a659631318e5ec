//! Extraction client for GribJump archives.
//!
//! [`GribJump`] is a client handle over an explicit [`Engine`] capability:
//! it validates requests, submits them as one batch, and returns an
//! [`ExtractionIterator`] that pairs each engine result with the shape of
//! the request that produced it. [`GribJump::axes`] walks the selector
//! space reachable from a partial key.
//!
//! The engine does the archive work (resolving keys, reading and
//! decompressing fields). Nothing here is process-global: every handle owns
//! its engine, and independent handles may live on different threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub(crate) mod observability;

pub mod axes;
pub mod client;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod iterator;

pub use axes::AxesMap;
pub use client::GribJump;
pub use config::{ClientConfig, ConfigError};
pub use context::RequestContext;
pub use engine::{Engine, ResultSource};
pub use error::GribJumpError;
pub use iterator::{ExtractionIterator, LegacyDump};
