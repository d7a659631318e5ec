//! Forward-only iteration over extraction results.
//!
//! [`ExtractionIterator`] advances the engine's [`ResultSource`] one result
//! at a time and attaches the shape of the request at the same position.
//! It buffers nothing beyond the result it is handing out, cannot be
//! restarted, and stops for good after clean completion or the first
//! failure. Dropping it early releases the engine source and anything not
//! yet pulled.

use std::iter::FusedIterator;

use gribjump_core::Shape;
use gribjump_result::ExtractionResult;

use crate::engine::ResultSource;
use crate::error::GribJumpError;
use crate::observability::{log_debug, log_warn};

/// Legacy nested dump: `[request][field][range] -> (values, mask words)`.
///
/// The field dimension always has length 1.
pub type LegacyDump = Vec<Vec<Vec<(Vec<f64>, Vec<u64>)>>>;

/// Where result shapes come from.
#[derive(Debug)]
pub(crate) enum ShapePlan {
    /// One shape per submitted request, consumed in order.
    PerRequest(Vec<Shape>),
    /// Every result shares one shape; the count is open-ended.
    Repeat(Shape),
}

/// Iterator over decoded results, in submission order.
pub struct ExtractionIterator {
    source: Option<Box<dyn ResultSource>>,
    shapes: ShapePlan,
    yielded: usize,
    action: &'static str,
}

impl std::fmt::Debug for ExtractionIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionIterator")
            .field("action", &self.action)
            .field("yielded", &self.yielded)
            .field("finished", &self.source.is_none())
            .finish_non_exhaustive()
    }
}

impl ExtractionIterator {
    pub(crate) fn new(
        source: Box<dyn ResultSource>,
        shapes: ShapePlan,
        action: &'static str,
    ) -> Self {
        Self {
            source: Some(source),
            shapes,
            yielded: 0,
            action,
        }
    }

    /// Number of results handed out so far.
    pub fn results_yielded(&self) -> usize {
        self.yielded
    }

    /// Whether the iterator has completed or failed.
    pub fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    /// Number of results the engine owes, if known up front.
    pub fn expected_results(&self) -> Option<usize> {
        match &self.shapes {
            ShapePlan::PerRequest(shapes) => Some(shapes.len()),
            ShapePlan::Repeat(_) => None,
        }
    }

    fn finish(&mut self) {
        self.source = None;
    }

    fn next_shape(&mut self) -> Option<Shape> {
        match &mut self.shapes {
            ShapePlan::PerRequest(shapes) => shapes.get_mut(self.yielded).map(std::mem::take),
            ShapePlan::Repeat(shape) => Some(shape.clone()),
        }
    }

    /// Owned per-range values of every remaining result.
    pub fn dump_values(self) -> Result<Vec<Vec<Vec<f64>>>, GribJumpError> {
        self.map(|result| -> Result<Vec<Vec<f64>>, GribJumpError> {
            Ok(result?.copy_values()?)
        })
        .collect()
    }

    /// Every remaining result in the legacy nested form.
    pub fn dump_legacy(self) -> Result<LegacyDump, GribJumpError> {
        self.map(|result| -> Result<Vec<Vec<(Vec<f64>, Vec<u64>)>>, GribJumpError> {
            let result = result?;
            let values = result.copy_values()?;
            let masks = result.copy_masks()?;
            Ok(vec![values.into_iter().zip(masks).collect()])
        })
        .collect()
    }
}

impl Iterator for ExtractionIterator {
    type Item = Result<ExtractionResult, GribJumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.source.as_mut()?;
        match source.next() {
            Ok(Some(raw)) => match self.next_shape() {
                Some(shape) => {
                    self.yielded += 1;
                    Some(Ok(ExtractionResult::new(raw, shape)))
                }
                None => {
                    let expected = self.expected_results().unwrap_or(self.yielded);
                    log_warn!(
                        event = "result_count_mismatch",
                        component = "iterator",
                        action = self.action,
                        expected,
                        yielded = self.yielded + 1,
                    );
                    self.finish();
                    Some(Err(GribJumpError::ResultCountMismatch {
                        expected,
                        yielded: self.yielded + 1,
                    }))
                }
            },
            Ok(None) => {
                self.finish();
                match self.expected_results() {
                    Some(expected) if expected != self.yielded => {
                        log_warn!(
                            event = "result_count_mismatch",
                            component = "iterator",
                            action = self.action,
                            expected,
                            yielded = self.yielded,
                        );
                        Some(Err(GribJumpError::ResultCountMismatch {
                            expected,
                            yielded: self.yielded,
                        }))
                    }
                    _ => {
                        log_debug!(
                            event = "extraction_complete",
                            component = "iterator",
                            action = self.action,
                            yielded = self.yielded,
                        );
                        None
                    }
                }
            }
            Err(e) => {
                log_warn!(
                    event = "engine_failure",
                    component = "iterator",
                    action = self.action,
                    position = self.yielded,
                    code = e.code,
                    message = %e.message,
                );
                self.finish();
                Some(Err(e.into()))
            }
        }
    }
}

impl FusedIterator for ExtractionIterator {}
