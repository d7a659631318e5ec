//! Benchmark inputs for GribJump.
//!
//! - [`striped_mask`]: a selection mask with runs of fixed width
//! - [`field_mask`]: the validity mask of a seeded random field
//! - [`packed_result`]: flat buffers for a request, as an engine returns them

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use gribjump_core::{range, Range, Shape};
use gribjump_result::{bitmask, BufferedResult, ExtractionResult};
use gribjump_test_utils::fixtures::random_field;

/// `len` positions alternating `run` selected and `run` unselected.
pub fn striped_mask(len: usize, run: usize) -> Vec<bool> {
    (0..len).map(|i| (i / run.max(1)) % 2 == 0).collect()
}

/// Validity mask of a seeded field with `missing_ratio` NaNs.
pub fn field_mask(seed: u64, len: usize, missing_ratio: f64) -> Vec<bool> {
    random_field(seed, len, missing_ratio)
        .iter()
        .map(|v| !v.is_nan())
        .collect()
}

/// A result for `ranges` over a seeded field, with buffers already packed.
pub fn packed_result(seed: u64, field_len: usize, ranges: &[Range]) -> ExtractionResult {
    let field = random_field(seed, field_len, 0.2);
    let mut values = Vec::with_capacity(range::total_len(ranges));
    let mut mask = Vec::new();
    for r in ranges {
        let slice = &field[r.positions()];
        let valid: Vec<bool> = slice.iter().map(|v| !v.is_nan()).collect();
        mask.extend(bitmask::pack_bits(&valid));
        values.extend_from_slice(slice);
    }
    ExtractionResult::new(
        Box::new(BufferedResult::new(values, mask)),
        Shape::of(ranges),
    )
}
