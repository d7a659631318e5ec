//! In-memory extraction engine.
//!
//! [`StubEngine`] archives fields by canonical key (selectors sorted by
//! name) and by file location, resolves requests lazily as the returned
//! source is advanced, and counts every call into it. Clones share the
//! archive and the counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gribjump_client::{Engine, ResultSource};
use gribjump_core::{
    EngineError, EngineStatus, ExtractionRequest, FileLocation, PathExtractionRequest,
    RangeRequest, RequestKey, SelectorValue,
};
use gribjump_result::{bitmask, RawResult};
use indexmap::IndexMap;

/// Axis names reported at each specificity level, coarsest first.
pub const AXES_BY_LEVEL: [&[&str]; 3] = [
    &["class", "date", "domain", "expver", "stream", "time"],
    &["levtype", "type"],
    &["levelist", "param", "step"],
];

// ── Counters ───────────────────────────────────────────────────────

/// Call and release counters shared by an engine and everything it hands
/// out.
#[derive(Debug, Default)]
pub struct CallCounts {
    submissions: AtomicUsize,
    next_calls: AtomicUsize,
    value_loads: AtomicUsize,
    mask_loads: AtomicUsize,
    axes_calls: AtomicUsize,
    results_released: AtomicUsize,
    sources_released: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

impl CallCounts {
    /// Batch and single submissions.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Calls to [`ResultSource::next`].
    pub fn next_calls(&self) -> usize {
        self.next_calls.load(Ordering::SeqCst)
    }

    /// Calls to [`RawResult::load_values`].
    pub fn value_loads(&self) -> usize {
        self.value_loads.load(Ordering::SeqCst)
    }

    /// Calls to [`RawResult::load_mask`].
    pub fn mask_loads(&self) -> usize {
        self.mask_loads.load(Ordering::SeqCst)
    }

    /// Axes queries.
    pub fn axes_calls(&self) -> usize {
        self.axes_calls.load(Ordering::SeqCst)
    }

    /// Result handles dropped.
    pub fn results_released(&self) -> usize {
        self.results_released.load(Ordering::SeqCst)
    }

    /// Result sources dropped.
    pub fn sources_released(&self) -> usize {
        self.sources_released.load(Ordering::SeqCst)
    }
}

// ── Archive ────────────────────────────────────────────────────────

#[derive(Debug)]
struct StubField {
    selectors: IndexMap<String, String>,
    values: Arc<Vec<f64>>,
    grid_hash: Option<String>,
}

#[derive(Debug, Default)]
struct Faults {
    submission: Option<EngineStatus>,
    next_at: Option<usize>,
    truncate_values: usize,
}

#[derive(Debug)]
struct Inner {
    version: String,
    fields: IndexMap<String, StubField>,
    paths: IndexMap<(String, u64), Arc<Vec<f64>>>,
    faults: Faults,
    counts: CallCounts,
    contexts: Mutex<Vec<String>>,
}

/// `name=value` pairs sorted by name, so selector order never matters.
fn canonical<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut pairs: Vec<(&str, &str)> = pairs.collect();
    pairs.sort_unstable();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn canonical_key(key: &RequestKey) -> String {
    let singles: Vec<(&str, String)> = key.iter().map(|(k, v)| (k, v.to_string())).collect();
    canonical(singles.iter().map(|(k, v)| (*k, v.as_str())))
}

/// Parse the engine wire form `k=v,k=v1/v2` back into a key.
fn parse_key(request: &str) -> Result<RequestKey, EngineError> {
    request
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| -> Result<(String, SelectorValue), EngineError> {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                EngineError::new(
                    "parse_request",
                    EngineStatus::InvalidArgument,
                    format!("selector '{part}' has no '='"),
                )
            })?;
            let value = if value.contains('/') {
                SelectorValue::Multi(value.split('/').map(str::to_string).collect())
            } else {
                SelectorValue::Single(value.to_string())
            };
            Ok((name.to_string(), value))
        })
        .collect()
}

// ── Builder ────────────────────────────────────────────────────────

/// Builder for [`StubEngine`].
#[derive(Debug)]
pub struct StubEngineBuilder {
    inner: Inner,
}

impl StubEngineBuilder {
    /// Archive `values` under every single-valued key `key` expands to.
    pub fn field(self, key: &RequestKey, values: Vec<f64>) -> Self {
        self.field_with_grid(key, values, None)
    }

    /// As [`field`](Self::field), with a grid hash checked on extraction.
    pub fn field_with_grid(
        mut self,
        key: &RequestKey,
        values: Vec<f64>,
        grid_hash: Option<&str>,
    ) -> Self {
        let values = Arc::new(values);
        for single in key.expand() {
            let selectors: IndexMap<String, String> = single
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.inner.fields.insert(
                canonical_key(&single),
                StubField {
                    selectors,
                    values: Arc::clone(&values),
                    grid_hash: grid_hash.map(str::to_string),
                },
            );
        }
        self
    }

    /// Archive `values` at a file location.
    pub fn path(mut self, location: &FileLocation, values: Vec<f64>) -> Self {
        self.inner
            .paths
            .insert((location.path.clone(), location.offset), Arc::new(values));
        self
    }

    /// Reported engine version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.inner.version = version.into();
        self
    }

    /// Refuse every submission with `status`.
    pub fn fail_submission(mut self, status: EngineStatus) -> Self {
        self.inner.faults.submission = Some(status);
        self
    }

    /// Fail the `n`-th (0-based) advance of every source.
    pub fn fail_next_at(mut self, n: usize) -> Self {
        self.inner.faults.next_at = Some(n);
        self
    }

    /// Drop the last `n` values of every loaded value buffer.
    pub fn truncate_values(mut self, n: usize) -> Self {
        self.inner.faults.truncate_values = n;
        self
    }

    pub fn build(self) -> StubEngine {
        StubEngine {
            inner: Arc::new(self.inner),
        }
    }
}

// ── Engine ─────────────────────────────────────────────────────────

/// In-memory [`Engine`].
#[derive(Clone, Debug)]
pub struct StubEngine {
    inner: Arc<Inner>,
}

impl StubEngine {
    pub fn builder() -> StubEngineBuilder {
        StubEngineBuilder {
            inner: Inner {
                version: "stub-0.0.0".into(),
                fields: IndexMap::new(),
                paths: IndexMap::new(),
                faults: Faults::default(),
                counts: CallCounts::default(),
                contexts: Mutex::new(Vec::new()),
            },
        }
    }

    /// Counters shared by this engine and its clones.
    pub fn counts(&self) -> &CallCounts {
        &self.inner.counts
    }

    /// Every context string received, in call order.
    pub fn contexts(&self) -> Vec<String> {
        self.inner
            .contexts
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn submit(&self, operation: &str, context: &str, jobs: Vec<Job>) -> SubmitResult {
        bump(&self.inner.counts.submissions);
        if let Ok(mut contexts) = self.inner.contexts.lock() {
            contexts.push(context.to_string());
        }
        if let Some(status) = self.inner.faults.submission {
            return Err(EngineError::new(operation, status, "submission refused"));
        }
        Ok(Box::new(StubSource {
            inner: Arc::clone(&self.inner),
            jobs: jobs.into_iter(),
            position: 0,
        }))
    }
}

type SubmitResult = Result<Box<dyn ResultSource>, EngineError>;

fn pairs_of(flat: &[usize]) -> Result<Vec<(usize, usize)>, EngineError> {
    if flat.len() % 2 != 0 {
        return Err(EngineError::new(
            "extract_single",
            EngineStatus::InvalidArgument,
            "odd number of range bounds",
        ));
    }
    Ok(flat.chunks(2).map(|c| (c[0], c[1])).collect())
}

impl Engine for StubEngine {
    fn version(&self) -> String {
        self.inner.version.clone()
    }

    fn extract(&self, requests: &[ExtractionRequest], context: &str) -> SubmitResult {
        let jobs = requests
            .iter()
            .map(|r| Job {
                target: Target::Key(canonical_key(r.key())),
                ranges: r.ranges().iter().map(|x| x.as_tuple()).collect(),
                grid_hash: r.grid_hash().map(str::to_string),
            })
            .collect();
        self.submit("extract", context, jobs)
    }

    fn extract_from_paths(&self, requests: &[PathExtractionRequest], context: &str) -> SubmitResult {
        let jobs = requests
            .iter()
            .map(|r| Job {
                target: Target::Path(r.location().path.clone(), r.location().offset),
                ranges: r.ranges().iter().map(|x| x.as_tuple()).collect(),
                grid_hash: r.grid_hash().map(str::to_string),
            })
            .collect();
        self.submit("extract_from_paths", context, jobs)
    }

    fn extract_single(
        &self,
        request: &str,
        ranges: &[usize],
        grid_hash: Option<&str>,
        context: &str,
    ) -> SubmitResult {
        let body = request.strip_prefix("retrieve,").ok_or_else(|| {
            EngineError::new(
                "extract_single",
                EngineStatus::InvalidArgument,
                "request must start with 'retrieve,'",
            )
        })?;
        let key = parse_key(body)?;
        let ranges = pairs_of(ranges)?;
        let jobs = key
            .expand()
            .iter()
            .map(|single| Job {
                target: Target::Key(canonical_key(single)),
                ranges: ranges.clone(),
                grid_hash: grid_hash.map(str::to_string),
            })
            .collect();
        self.submit("extract_single", context, jobs)
    }

    fn axes(
        &self,
        request: &str,
        level: u32,
        context: &str,
    ) -> Result<Vec<(String, Vec<String>)>, EngineError> {
        bump(&self.inner.counts.axes_calls);
        if let Ok(mut contexts) = self.inner.contexts.lock() {
            contexts.push(context.to_string());
        }
        let depth = usize::try_from(level).unwrap_or(usize::MAX);
        if !(1..=AXES_BY_LEVEL.len()).contains(&depth) {
            return Err(EngineError::new(
                "axes",
                EngineStatus::InvalidArgument,
                format!("level {level} not supported"),
            ));
        }
        let partial = parse_key(request)?;
        let matching: Vec<&StubField> = self
            .inner
            .fields
            .values()
            .filter(|field| {
                partial.iter().all(|(name, wanted)| {
                    field
                        .selectors
                        .get(name)
                        .is_some_and(|v| wanted.values().contains(&v.as_str()))
                })
            })
            .collect();
        let mut out = Vec::new();
        for name in AXES_BY_LEVEL[..depth].iter().flat_map(|names| names.iter()) {
            let mut values: Vec<String> = Vec::new();
            for field in &matching {
                let value = field.selectors.get(*name).cloned().unwrap_or_default();
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            out.push((name.to_string(), values));
        }
        Ok(out)
    }
}

// ── Sources and results ────────────────────────────────────────────

#[derive(Debug)]
enum Target {
    Key(String),
    Path(String, u64),
}

#[derive(Debug)]
struct Job {
    target: Target,
    ranges: Vec<(usize, usize)>,
    grid_hash: Option<String>,
}

struct StubSource {
    inner: Arc<Inner>,
    jobs: std::vec::IntoIter<Job>,
    position: usize,
}

impl StubSource {
    fn resolve(&self, job: Job) -> Result<StubResult, EngineError> {
        let (values, field_hash) = match &job.target {
            Target::Key(key) => {
                let field = self.inner.fields.get(key).ok_or_else(|| {
                    EngineError::new("next", EngineStatus::NotFound, format!("no field for '{key}'"))
                })?;
                (Arc::clone(&field.values), field.grid_hash.as_deref())
            }
            Target::Path(path, offset) => {
                let values = self
                    .inner
                    .paths
                    .get(&(path.clone(), *offset))
                    .ok_or_else(|| {
                        EngineError::new(
                            "next",
                            EngineStatus::NotFound,
                            format!("nothing at {path}:{offset}"),
                        )
                    })?;
                (Arc::clone(values), None)
            }
        };
        if let (Some(wanted), Some(actual)) = (job.grid_hash.as_deref(), field_hash) {
            if wanted != actual {
                return Err(EngineError::new(
                    "next",
                    EngineStatus::GridHashMismatch,
                    format!("grid hash '{wanted}' does not match field grid '{actual}'"),
                ));
            }
        }
        let mut flat = Vec::new();
        let mut mask = Vec::new();
        for &(lo, hi) in &job.ranges {
            let slice = values.get(lo..hi).ok_or_else(|| {
                EngineError::new(
                    "next",
                    EngineStatus::OutOfRange,
                    format!("range [{lo}, {hi}) outside field of {}", values.len()),
                )
            })?;
            let valid: Vec<bool> = slice.iter().map(|v| !v.is_nan()).collect();
            mask.extend(bitmask::pack_bits(&valid));
            flat.extend_from_slice(slice);
        }
        let keep = flat.len().saturating_sub(self.inner.faults.truncate_values);
        flat.truncate(keep);
        Ok(StubResult {
            inner: Arc::clone(&self.inner),
            values: flat,
            mask,
        })
    }
}

impl ResultSource for StubSource {
    fn next(&mut self) -> Result<Option<Box<dyn RawResult>>, EngineError> {
        bump(&self.inner.counts.next_calls);
        let position = self.position;
        self.position += 1;
        if self.inner.faults.next_at == Some(position) {
            return Err(EngineError::new(
                "next",
                EngineStatus::Failure,
                format!("injected failure at position {position}"),
            ));
        }
        match self.jobs.next() {
            Some(job) => Ok(Some(Box::new(self.resolve(job)?) as Box<dyn RawResult>)),
            None => Ok(None),
        }
    }
}

impl Drop for StubSource {
    fn drop(&mut self) {
        bump(&self.inner.counts.sources_released);
    }
}

struct StubResult {
    inner: Arc<Inner>,
    values: Vec<f64>,
    mask: Vec<u64>,
}

impl RawResult for StubResult {
    fn load_values(&self) -> Result<Vec<f64>, EngineError> {
        bump(&self.inner.counts.value_loads);
        Ok(self.values.clone())
    }

    fn load_mask(&self) -> Result<Vec<u64>, EngineError> {
        bump(&self.inner.counts.mask_loads);
        Ok(self.mask.clone())
    }
}

impl Drop for StubResult {
    fn drop(&mut self) {
        bump(&self.inner.counts.results_released);
    }
}
