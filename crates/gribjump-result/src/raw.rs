//! Engine-owned result handles.
//!
//! [`RawResult`] is the seam between the decoder and an extraction engine:
//! each call hands over one of the two flat buffers for a resolved request.
//! Dropping the handle releases whatever the engine holds for it.

use gribjump_core::EngineError;

/// One resolved request's data, as held by the engine.
///
/// Loads may be expensive (a round trip or a copy out of foreign memory);
/// [`ExtractionResult`](crate::ExtractionResult) calls each at most once on
/// success.
pub trait RawResult: Send {
    /// The flat value buffer, `sum(shape)` doubles in range order.
    fn load_values(&self) -> Result<Vec<f64>, EngineError>;

    /// The flat packed mask, `sum(ceil(shape[i] / 64))` words in range order.
    fn load_mask(&self) -> Result<Vec<u64>, EngineError>;
}

/// A result whose buffers are already in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferedResult {
    values: Vec<f64>,
    mask: Vec<u64>,
}

impl BufferedResult {
    /// Wrap two flat buffers.
    pub fn new(values: Vec<f64>, mask: Vec<u64>) -> Self {
        Self { values, mask }
    }
}

impl RawResult for BufferedResult {
    fn load_values(&self) -> Result<Vec<f64>, EngineError> {
        Ok(self.values.clone())
    }

    fn load_mask(&self) -> Result<Vec<u64>, EngineError> {
        Ok(self.mask.clone())
    }
}
