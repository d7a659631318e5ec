//! Lazily decoded extraction results.
//!
//! [`ExtractionResult`] owns one engine result handle plus the shape of the
//! request that produced it. Buffers are pulled from the handle on first
//! access, checked against the shape, and cached; every later view is a
//! slice into the cache.

use std::cell::OnceCell;

use gribjump_core::{BufferKind, Shape, ShapeMismatchError};
use smallvec::SmallVec;

use crate::bitmask;
use crate::error::DecodeError;
use crate::raw::RawResult;

/// Decoded result of one extraction request.
///
/// Not `Sync`: views are owned by the consuming thread. Dropping the result
/// releases the engine handle and every cached buffer.
pub struct ExtractionResult {
    handle: Box<dyn RawResult>,
    shape: Shape,
    values: OnceCell<Vec<f64>>,
    mask: OnceCell<Vec<u64>>,
}

impl std::fmt::Debug for ExtractionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionResult")
            .field("shape", &self.shape)
            .field("values_loaded", &self.values.get().is_some())
            .field("mask_loaded", &self.mask.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Cut `flat` into consecutive slices of the given lengths.
///
/// Callers guarantee `lens` sums to `flat.len()`.
fn split<'a, T>(flat: &'a [T], lens: &[usize]) -> Vec<&'a [T]> {
    let mut rest = flat;
    let mut out = Vec::with_capacity(lens.len());
    for &n in lens {
        let (head, tail) = rest.split_at(n);
        out.push(head);
        rest = tail;
    }
    out
}

impl ExtractionResult {
    /// Take ownership of an engine result answering a request of `shape`.
    pub fn new(handle: Box<dyn RawResult>, shape: Shape) -> Self {
        Self {
            handle,
            shape,
            values: OnceCell::new(),
            mask: OnceCell::new(),
        }
    }

    /// Per-range value counts.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Per-range mask word counts, `ceil(shape[i] / 64)`.
    pub fn mask_shape(&self) -> SmallVec<[usize; 4]> {
        self.shape.mask_words()
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Whether the result has no ranges.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Whether the value buffer has been pulled from the engine.
    pub fn values_loaded(&self) -> bool {
        self.values.get().is_some()
    }

    /// Whether the mask buffer has been pulled from the engine.
    pub fn mask_loaded(&self) -> bool {
        self.mask.get().is_some()
    }

    fn check(buffer: BufferKind, expected: usize, actual: usize) -> Result<(), DecodeError> {
        if expected == actual {
            return Ok(());
        }
        log_warn!(
            event = "shape_mismatch",
            component = "decode",
            buffer = %buffer,
            expected,
            actual,
        );
        Err(ShapeMismatchError {
            buffer,
            expected,
            actual,
        }
        .into())
    }

    /// All values, flat, in range order. Loads on first call.
    pub fn values_flat(&self) -> Result<&[f64], DecodeError> {
        if let Some(values) = self.values.get() {
            return Ok(values);
        }
        let values = self.handle.load_values()?;
        Self::check(BufferKind::Values, self.shape.total(), values.len())?;
        Ok(self.values.get_or_init(|| values))
    }

    /// All packed mask words, flat, in range order. Loads on first call.
    pub fn masks_flat(&self) -> Result<&[u64], DecodeError> {
        if let Some(mask) = self.mask.get() {
            return Ok(mask);
        }
        let mask = self.handle.load_mask()?;
        Self::check(BufferKind::Mask, self.shape.total_mask_words(), mask.len())?;
        Ok(self.mask.get_or_init(|| mask))
    }

    /// One value slice per range, lengths `shape[i]`.
    pub fn values(&self) -> Result<Vec<&[f64]>, DecodeError> {
        Ok(split(self.values_flat()?, self.shape.lens()))
    }

    /// One packed mask slice per range, lengths `ceil(shape[i] / 64)`.
    pub fn masks(&self) -> Result<Vec<&[u64]>, DecodeError> {
        Ok(split(self.masks_flat()?, &self.mask_shape()))
    }

    /// One boolean validity array per range, exactly `shape[i]` long.
    ///
    /// `true` marks a position that was present in the source field.
    pub fn bool_masks(&self) -> Result<Vec<Vec<bool>>, DecodeError> {
        let masks = self.masks()?;
        let mut read = 0;
        let out: Vec<Vec<bool>> = masks
            .iter()
            .zip(self.shape.lens())
            .map(|(words, &n)| {
                read += n;
                bitmask::unpack_bits(words, n)
            })
            .collect();
        Self::check(BufferKind::Mask, self.shape.total(), read)?;
        Ok(out)
    }

    /// Number of valid (present) positions across all ranges.
    pub fn count_valid(&self) -> Result<usize, DecodeError> {
        let masks = self.masks()?;
        Ok(masks
            .iter()
            .zip(self.shape.lens())
            .map(|(words, &n)| bitmask::count_set(words, n))
            .sum())
    }

    /// Owned copies of the per-range values.
    pub fn copy_values(&self) -> Result<Vec<Vec<f64>>, DecodeError> {
        Ok(self.values()?.into_iter().map(<[f64]>::to_vec).collect())
    }

    /// Owned copies of the per-range packed masks.
    pub fn copy_masks(&self) -> Result<Vec<Vec<u64>>, DecodeError> {
        Ok(self.masks()?.into_iter().map(<[u64]>::to_vec).collect())
    }
}
