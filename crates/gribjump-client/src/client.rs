//! The client handle.
//!
//! [`GribJump`] owns one [`Engine`] and a validated [`ClientConfig`]. Every
//! operation validates its input before the engine sees it, merges the
//! caller's [`RequestContext`] over the client defaults, and makes exactly
//! one blocking engine call. Extraction operations return an
//! [`ExtractionIterator`]; nothing is fetched until it is advanced.

use gribjump_core::{
    range, EngineError, ExtractionRequest, PathExtractionRequest, Range, RangeRequest, RequestKey,
    Shape,
};

use crate::axes::{self, AxesMap};
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::engine::Engine;
use crate::error::GribJumpError;
use crate::iterator::{ExtractionIterator, ShapePlan};
use crate::observability::{log_info, log_warn};

/// A client bound to one extraction engine.
///
/// Handles share nothing with each other. A handle is `Send + Sync` when its
/// engine is, so one may serve several threads, but each returned iterator
/// belongs to the thread consuming it.
pub struct GribJump<E: Engine> {
    engine: E,
    config: ClientConfig,
}

impl<E: Engine> std::fmt::Debug for GribJump<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GribJump")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn engine_failure(action: &'static str, e: EngineError) -> GribJumpError {
    log_warn!(
        event = "engine_failure",
        component = "client",
        action,
        operation = %e.operation,
        code = e.code,
        message = %e.message,
    );
    e.into()
}

impl<E: Engine> GribJump<E> {
    /// A client with the default configuration.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: ClientConfig::default(),
        }
    }

    /// A client with an explicit configuration, validated first.
    pub fn with_config(engine: E, config: ClientConfig) -> Result<Self, GribJumpError> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Compact-JSON context for one call: caller entries over defaults.
    pub fn context_json(
        &self,
        action: &str,
        context: Option<&RequestContext>,
    ) -> Result<String, GribJumpError> {
        let defaults =
            RequestContext::defaults(&self.config.context_source, action, &self.engine.version());
        let merged = match context {
            Some(ctx) => ctx.merged_over(defaults),
            None => defaults,
        };
        Ok(merged.to_json()?)
    }

    fn grid_hash_suppressed(&self, action: &'static str, present: usize) -> bool {
        if self.config.ignore_grid_hash && present > 0 {
            log_info!(
                event = "grid_hash_suppressed",
                component = "client",
                action,
                requests = present,
            );
        }
        self.config.ignore_grid_hash
    }

    // ── Batch extraction ───────────────────────────────────────────

    /// Submit a batch of key-addressed requests.
    ///
    /// Result `i` of the returned iterator answers `requests[i]`.
    pub fn extract(
        &self,
        requests: Vec<ExtractionRequest>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        const ACTION: &str = "extract";
        if requests.is_empty() {
            return Err(GribJumpError::EmptyBatch);
        }
        let hashed = requests.iter().filter(|r| r.grid_hash().is_some()).count();
        let requests: Vec<ExtractionRequest> = if self.grid_hash_suppressed(ACTION, hashed) {
            requests
                .into_iter()
                .map(ExtractionRequest::without_grid_hash)
                .collect()
        } else {
            requests
        };
        let shapes: Vec<Shape> = requests.iter().map(|r| r.shape().clone()).collect();
        let ctx = self.context_json(ACTION, context)?;
        log_info!(
            event = "batch_submitted",
            component = "client",
            action = ACTION,
            requests = requests.len(),
        );
        let source = self
            .engine
            .extract(&requests, &ctx)
            .map_err(|e| engine_failure(ACTION, e))?;
        Ok(ExtractionIterator::new(
            source,
            ShapePlan::PerRequest(shapes),
            ACTION,
        ))
    }

    /// Submit a batch of location-addressed requests.
    pub fn extract_from_paths(
        &self,
        requests: Vec<PathExtractionRequest>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        const ACTION: &str = "extract_from_paths";
        if requests.is_empty() {
            return Err(GribJumpError::EmptyBatch);
        }
        let hashed = requests.iter().filter(|r| r.grid_hash().is_some()).count();
        let requests: Vec<PathExtractionRequest> = if self.grid_hash_suppressed(ACTION, hashed) {
            requests
                .into_iter()
                .map(PathExtractionRequest::without_grid_hash)
                .collect()
        } else {
            requests
        };
        let shapes: Vec<Shape> = requests.iter().map(|r| r.shape().clone()).collect();
        let ctx = self.context_json(ACTION, context)?;
        log_info!(
            event = "batch_submitted",
            component = "client",
            action = ACTION,
            requests = requests.len(),
        );
        let source = self
            .engine
            .extract_from_paths(&requests, &ctx)
            .map_err(|e| engine_failure(ACTION, e))?;
        Ok(ExtractionIterator::new(
            source,
            ShapePlan::PerRequest(shapes),
            ACTION,
        ))
    }

    /// Extract the same ranges from every field a multi-valued key expands
    /// to, in one engine call.
    ///
    /// Every result has the shape of `ranges`. The number of results is
    /// whatever the engine resolves the key to.
    pub fn extract_single(
        &self,
        key: &RequestKey,
        ranges: &[(usize, usize)],
        grid_hash: Option<String>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        const ACTION: &str = "extract_single";
        let request = ExtractionRequest::new(key.clone(), ranges, grid_hash)?;
        let suppress = self.grid_hash_suppressed(ACTION, usize::from(request.grid_hash().is_some()));
        let grid_hash = if suppress { None } else { request.grid_hash() };
        let ctx = self.context_json(ACTION, context)?;
        log_info!(
            event = "batch_submitted",
            component = "client",
            action = ACTION,
            fields = key.cardinality(),
        );
        let source = self
            .engine
            .extract_single(
                &request.retrieve_string(),
                &request.flat_ranges(),
                grid_hash,
                &ctx,
            )
            .map_err(|e| engine_failure(ACTION, e))?;
        Ok(ExtractionIterator::new(
            source,
            ShapePlan::Repeat(request.shape().clone()),
            ACTION,
        ))
    }

    // ── One range set, many keys ───────────────────────────────────

    fn extract_many(
        &self,
        keys: &[RequestKey],
        ranges: Vec<Range>,
        grid_hash: Option<&str>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        let requests = keys
            .iter()
            .map(|key| {
                ExtractionRequest::from_ranges(
                    key.clone(),
                    ranges.clone(),
                    grid_hash.map(str::to_string),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.extract(requests, context)
    }

    /// Extract the same `(lo, hi)` ranges from every key.
    pub fn extract_from_ranges(
        &self,
        keys: &[RequestKey],
        ranges: &[(usize, usize)],
        grid_hash: Option<&str>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        self.extract_many(keys, range::validate(ranges)?, grid_hash, context)
    }

    /// Extract the positions selected by `mask` from every key.
    pub fn extract_from_mask(
        &self,
        keys: &[RequestKey],
        mask: &[bool],
        grid_hash: Option<&str>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        self.extract_many(keys, range::from_mask(mask)?, grid_hash, context)
    }

    /// Extract the given point indices from every key, one range per point.
    pub fn extract_from_indices(
        &self,
        keys: &[RequestKey],
        points: &[usize],
        grid_hash: Option<&str>,
        context: Option<&RequestContext>,
    ) -> Result<ExtractionIterator, GribJumpError> {
        self.extract_many(keys, range::from_indices(points)?, grid_hash, context)
    }

    // ── Axes ───────────────────────────────────────────────────────

    /// Axes reachable from `key`. `None` uses the configured default level.
    pub fn axes(
        &self,
        key: &RequestKey,
        level: Option<u32>,
        context: Option<&RequestContext>,
    ) -> Result<AxesMap, GribJumpError> {
        const ACTION: &str = "axes";
        let level = level.unwrap_or(self.config.default_axes_level);
        let ctx = self.context_json(ACTION, context)?;
        match axes::discover(&self.engine, key, level, &ctx) {
            Err(GribJumpError::Engine(e)) => Err(engine_failure(ACTION, e)),
            other => other,
        }
    }
}
