//! The extraction engine boundary.
//!
//! [`Engine`] is the capability a [`GribJump`](crate::GribJump) client is
//! constructed with. Implementations resolve requests against an archive
//! and stream one [`RawResult`] per resolved field through a
//! [`ResultSource`].
//!
//! # Ordering contract
//!
//! For batch calls, the source must yield result `i` for request `i`. The
//! client pairs results with request shapes by position; there is no
//! identifier on the wire to re-associate them.

use gribjump_core::{EngineError, ExtractionRequest, PathExtractionRequest};
use gribjump_result::RawResult;

/// Forward-only stream of engine results.
pub trait ResultSource: Send {
    /// Block until the next result is available.
    ///
    /// `Ok(None)` is clean completion. An `Err` is an engine-side failure at
    /// this position; callers do not advance the source after one.
    fn next(&mut self) -> Result<Option<Box<dyn RawResult>>, EngineError>;
}

/// An extraction engine.
///
/// Every method blocks the calling thread until the engine responds.
/// `context` is an opaque compact-JSON string describing the caller, used
/// by the engine for logging only.
pub trait Engine: Send + Sync {
    /// Engine version string, reported in the request context.
    fn version(&self) -> String;

    /// Submit a batch of key-addressed requests.
    fn extract(
        &self,
        requests: &[ExtractionRequest],
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError>;

    /// Submit a batch of location-addressed requests.
    fn extract_from_paths(
        &self,
        requests: &[PathExtractionRequest],
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError>;

    /// Submit one request whose key may expand into many fields.
    ///
    /// `request` is the `retrieve,`-prefixed serialized key and `ranges` the
    /// flat `[lo, hi, ...]` form. Every yielded result has the same shape;
    /// how many there are is only known once the source completes.
    fn extract_single(
        &self,
        request: &str,
        ranges: &[usize],
        grid_hash: Option<&str>,
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError>;

    /// Selector names and values reachable from `request` at `level`.
    fn axes(
        &self,
        request: &str,
        level: u32,
        context: &str,
    ) -> Result<Vec<(String, Vec<String>)>, EngineError>;
}

impl<E: Engine + ?Sized> Engine for std::sync::Arc<E> {
    fn version(&self) -> String {
        (**self).version()
    }

    fn extract(
        &self,
        requests: &[ExtractionRequest],
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError> {
        (**self).extract(requests, context)
    }

    fn extract_from_paths(
        &self,
        requests: &[PathExtractionRequest],
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError> {
        (**self).extract_from_paths(requests, context)
    }

    fn extract_single(
        &self,
        request: &str,
        ranges: &[usize],
        grid_hash: Option<&str>,
        context: &str,
    ) -> Result<Box<dyn ResultSource>, EngineError> {
        (**self).extract_single(request, ranges, grid_hash, context)
    }

    fn axes(
        &self,
        request: &str,
        level: u32,
        context: &str,
    ) -> Result<Vec<(String, Vec<String>)>, EngineError> {
        (**self).axes(request, level, context)
    }
}
