//! Half-open index ranges and their conversions.
//!
//! A [`Range`] is a validated `[lo, hi)` span of positions within a
//! flattened field. Lists of ranges are the canonical selection form sent
//! to the engine; boolean masks and point lists are converted into them
//! with [`from_mask`] and [`from_indices`].
//!
//! Range lists are kept exactly as the caller wrote them. Overlapping,
//! unordered, and duplicate ranges are all legal and are never merged, so
//! a round trip through [`to_mask`] and [`from_mask`] only reproduces the
//! input when it is already sorted and disjoint.

use std::fmt;

use smallvec::SmallVec;

use crate::error::InvalidRangeError;

/// Number of validity bits packed into one mask word.
pub const BITS_PER_WORD: usize = 64;

/// Number of packed mask words needed for `len` positions.
pub const fn mask_word_count(len: usize) -> usize {
    len.div_ceil(BITS_PER_WORD)
}

/// A non-empty half-open interval `[lo, hi)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    lo: usize,
    hi: usize,
}

impl Range {
    /// Create a range, rejecting `lo >= hi`.
    pub fn new(lo: usize, hi: usize) -> Result<Self, InvalidRangeError> {
        if lo >= hi {
            return Err(InvalidRangeError::Inverted { index: 0, lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Inclusive lower bound.
    pub fn lo(&self) -> usize {
        self.lo
    }

    /// Exclusive upper bound.
    pub fn hi(&self) -> usize {
        self.hi
    }

    /// Number of positions covered. Always at least 1.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Whether `position` falls inside the range.
    pub fn contains(&self, position: usize) -> bool {
        self.lo <= position && position < self.hi
    }

    /// The covered positions as a std range.
    pub fn positions(&self) -> std::ops::Range<usize> {
        self.lo..self.hi
    }

    /// The `(lo, hi)` pair.
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.lo, self.hi)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

impl TryFrom<(usize, usize)> for Range {
    type Error = InvalidRangeError;

    fn try_from((lo, hi): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

/// Per-range lengths of a request, in range order.
///
/// The shape is what the decoder uses to cut flat result buffers back into
/// one array per range.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// Shape of a list of ranges.
    pub fn of(ranges: &[Range]) -> Self {
        Self(ranges.iter().map(Range::len).collect())
    }

    /// Per-range lengths.
    pub fn lens(&self) -> &[usize] {
        &self.0
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the shape has no ranges.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of values, `sum(s_i)`.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Packed mask words per range, `ceil(s_i / 64)`.
    pub fn mask_words(&self) -> SmallVec<[usize; 4]> {
        self.0.iter().map(|&n| mask_word_count(n)).collect()
    }

    /// Total packed mask words, `sum(ceil(s_i / 64))`.
    pub fn total_mask_words(&self) -> usize {
        self.0.iter().map(|&n| mask_word_count(n)).sum()
    }
}

impl From<Vec<usize>> for Shape {
    fn from(lens: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(lens))
    }
}

impl From<&[usize]> for Shape {
    fn from(lens: &[usize]) -> Self {
        Self(SmallVec::from_slice(lens))
    }
}

/// Validate raw `(lo, hi)` pairs.
///
/// Fails on an empty list, on any pair with `lo >= hi`, or when the
/// lengths sum past `usize::MAX`. Order, overlap,
/// and gaps are preserved verbatim.
pub fn validate(pairs: &[(usize, usize)]) -> Result<Vec<Range>, InvalidRangeError> {
    if pairs.is_empty() {
        return Err(InvalidRangeError::Empty);
    }
    let ranges = pairs
        .iter()
        .enumerate()
        .map(|(index, &(lo, hi))| {
            if lo >= hi {
                Err(InvalidRangeError::Inverted { index, lo, hi })
            } else {
                Ok(Range { lo, hi })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    checked_total_len(&ranges)?;
    Ok(ranges)
}

/// Ranges covering each maximal run of `true` in `mask`, left to right.
///
/// Equivalent to padding the mask with `false` on both sides and taking the
/// forward difference: `+1` opens a run and `-1` closes it. An all-false
/// (or empty) mask is a caller error, not an empty selection.
pub fn from_mask(mask: &[bool]) -> Result<Vec<Range>, InvalidRangeError> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut prev = false;
    for (i, &bit) in mask.iter().chain(std::iter::once(&false)).enumerate() {
        match (prev, bit) {
            (false, true) => start = i,
            (true, false) => ranges.push(Range { lo: start, hi: i }),
            _ => {}
        }
        prev = bit;
    }
    if ranges.is_empty() {
        return Err(InvalidRangeError::EmptyMask);
    }
    Ok(ranges)
}

/// One unit range `[p, p + 1)` per point, in input order.
///
/// Duplicates are kept and produce duplicate unit ranges, so the mapping
/// stays order-preserving and reversible through [`to_indices`].
pub fn from_indices(points: &[usize]) -> Result<Vec<Range>, InvalidRangeError> {
    if points.is_empty() {
        return Err(InvalidRangeError::Empty);
    }
    points
        .iter()
        .enumerate()
        .map(|(index, &p)| {
            let hi = p
                .checked_add(1)
                .ok_or(InvalidRangeError::Overflow { index, position: p })?;
            Ok(Range { lo: p, hi })
        })
        .collect()
}

/// Every position covered by `ranges`, concatenated in range order.
pub fn to_indices(ranges: &[Range]) -> Vec<usize> {
    let mut out = Vec::with_capacity(total_len(ranges));
    for r in ranges {
        out.extend(r.positions());
    }
    out
}

/// A boolean mask of length `len` with every covered position set.
///
/// Positions at or beyond `len` are dropped.
pub fn to_mask(ranges: &[Range], len: usize) -> Vec<bool> {
    let mut mask = vec![false; len];
    for r in ranges {
        let hi = r.hi.min(len);
        if r.lo < hi {
            mask[r.lo..hi].fill(true);
        }
    }
    mask
}

/// Sum of range lengths.
///
/// Lists built by [`validate`] or accepted by a request never overflow.
pub fn total_len(ranges: &[Range]) -> usize {
    ranges.iter().map(Range::len).sum()
}

/// Sum of range lengths, or the index of the range that overflows it.
pub fn checked_total_len(ranges: &[Range]) -> Result<usize, InvalidRangeError> {
    ranges.iter().enumerate().try_fold(0usize, |total, (index, r)| {
        total
            .checked_add(r.len())
            .ok_or(InvalidRangeError::TotalOverflow { index })
    })
}

/// Ranges flattened as `[lo0, hi0, lo1, hi1, ...]`, the engine wire form.
pub fn flatten(ranges: &[Range]) -> Vec<usize> {
    ranges.iter().flat_map(|r| [r.lo, r.hi]).collect()
}

/// Parse a compact range string such as `"0-6,7-12"`.
pub fn parse_ranges(input: &str) -> Result<Vec<Range>, InvalidRangeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InvalidRangeError::Empty);
    }
    input
        .split(',')
        .enumerate()
        .map(|(index, part)| {
            let part = part.trim();
            let (lo, hi) = part.split_once('-').ok_or_else(|| InvalidRangeError::Malformed {
                input: part.to_string(),
                reason: "expected 'lo-hi'".into(),
            })?;
            let lo = parse_bound(part, lo)?;
            let hi = parse_bound(part, hi)?;
            if lo >= hi {
                return Err(InvalidRangeError::Inverted { index, lo, hi });
            }
            Ok(Range { lo, hi })
        })
        .collect()
}

fn parse_bound(part: &str, bound: &str) -> Result<usize, InvalidRangeError> {
    bound
        .trim()
        .parse()
        .map_err(|e| InvalidRangeError::Malformed {
            input: part.to_string(),
            reason: format!("bad bound '{bound}': {e}"),
        })
}

/// Format ranges as a compact range string, the inverse of [`parse_ranges`].
pub fn format_ranges(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(|r| format!("{}-{}", r.lo, r.hi))
        .collect::<Vec<_>>()
        .join(",")
}
