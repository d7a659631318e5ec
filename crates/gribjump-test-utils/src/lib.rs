//! Test utilities for GribJump development.
//!
//! Provides [`StubEngine`], an in-memory [`Engine`](gribjump_client::Engine)
//! with call counters and failure injection, and fixtures reproducing the
//! synthetic archive used across the client tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod stub;

pub use stub::{CallCounts, StubEngine, StubEngineBuilder};

/// Install a test-scoped `tracing` subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
