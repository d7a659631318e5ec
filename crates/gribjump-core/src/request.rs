//! Extraction request descriptors.
//!
//! An [`ExtractionRequest`] pairs a [`RequestKey`] with a validated list of
//! ranges and an optional grid hash. A [`PathExtractionRequest`] does the
//! same for a field addressed directly by file location, bypassing
//! key-based resolution. Both are immutable and are consumed by a single
//! batch extraction call.

use crate::error::InvalidRangeError;
use crate::key::RequestKey;
use crate::range::{self, Range, Shape};

/// Common view over requests: the ranges to extract and their shape.
///
/// The decoder only ever needs this much of a request to reshape its result.
pub trait RangeRequest {
    /// Validated ranges, in caller order.
    fn ranges(&self) -> &[Range];

    /// Per-range lengths.
    fn shape(&self) -> &Shape;

    /// Optional grid hash checked by the engine against the field.
    fn grid_hash(&self) -> Option<&str>;

    /// Ranges in the engine wire form `[lo0, hi0, lo1, hi1, ...]`.
    fn flat_ranges(&self) -> Vec<usize> {
        range::flatten(self.ranges())
    }

    /// Absolute positions that would be retrieved, in range order.
    fn indices(&self) -> Vec<usize> {
        range::to_indices(self.ranges())
    }
}

fn checked(ranges: Vec<Range>) -> Result<(Vec<Range>, Shape), InvalidRangeError> {
    if ranges.is_empty() {
        return Err(InvalidRangeError::Empty);
    }
    range::checked_total_len(&ranges)?;
    let shape = Shape::of(&ranges);
    Ok((ranges, shape))
}

/// A key-addressed extraction request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionRequest {
    key: RequestKey,
    ranges: Vec<Range>,
    grid_hash: Option<String>,
    shape: Shape,
}

impl ExtractionRequest {
    /// Build from raw `(lo, hi)` pairs.
    pub fn new(
        key: RequestKey,
        ranges: &[(usize, usize)],
        grid_hash: Option<String>,
    ) -> Result<Self, InvalidRangeError> {
        Self::from_ranges(key, range::validate(ranges)?, grid_hash)
    }

    /// Build from already-validated ranges.
    pub fn from_ranges(
        key: RequestKey,
        ranges: Vec<Range>,
        grid_hash: Option<String>,
    ) -> Result<Self, InvalidRangeError> {
        let (ranges, shape) = checked(ranges)?;
        Ok(Self {
            key,
            ranges,
            grid_hash,
            shape,
        })
    }

    /// Build from a boolean selection mask over the field.
    pub fn from_mask(
        key: RequestKey,
        mask: &[bool],
        grid_hash: Option<String>,
    ) -> Result<Self, InvalidRangeError> {
        Self::from_ranges(key, range::from_mask(mask)?, grid_hash)
    }

    /// Build from point indices, one unit range per point.
    pub fn from_indices(
        key: RequestKey,
        points: &[usize],
        grid_hash: Option<String>,
    ) -> Result<Self, InvalidRangeError> {
        Self::from_ranges(key, range::from_indices(points)?, grid_hash)
    }

    /// The field selector.
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Engine-facing serialized key.
    pub fn serialized_key(&self) -> String {
        self.key.serialize()
    }

    /// Serialized key prefixed with the `retrieve` verb, the form expected
    /// for single high-cardinality requests.
    pub fn retrieve_string(&self) -> String {
        format!("retrieve,{}", self.key.serialize())
    }

    /// The same request with its grid hash removed.
    pub fn without_grid_hash(mut self) -> Self {
        self.grid_hash = None;
        self
    }
}

impl RangeRequest for ExtractionRequest {
    fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn grid_hash(&self) -> Option<&str> {
        self.grid_hash.as_deref()
    }
}

impl TryFrom<(RequestKey, Vec<(usize, usize)>)> for ExtractionRequest {
    type Error = InvalidRangeError;

    fn try_from((key, ranges): (RequestKey, Vec<(usize, usize)>)) -> Result<Self, Self::Error> {
        Self::new(key, &ranges, None)
    }
}

impl TryFrom<(RequestKey, Vec<(usize, usize)>, Option<String>)> for ExtractionRequest {
    type Error = InvalidRangeError;

    fn try_from(
        (key, ranges, grid_hash): (RequestKey, Vec<(usize, usize)>, Option<String>),
    ) -> Result<Self, Self::Error> {
        Self::new(key, &ranges, grid_hash)
    }
}

/// Direct location of an archived field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileLocation {
    /// Path of the containing file.
    pub path: String,
    /// URI scheme, e.g. `file`.
    pub scheme: String,
    /// Byte offset of the field within the file.
    pub offset: u64,
    /// Host serving the file; empty for local files.
    pub host: String,
    /// Port on `host`; 0 for local files.
    pub port: u16,
}

impl FileLocation {
    /// A location on the local filesystem.
    pub fn local(path: impl Into<String>, offset: u64) -> Self {
        Self {
            path: path.into(),
            scheme: "file".into(),
            offset,
            host: String::new(),
            port: 0,
        }
    }
}

/// An extraction request addressed by file location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathExtractionRequest {
    location: FileLocation,
    ranges: Vec<Range>,
    grid_hash: Option<String>,
    shape: Shape,
}

impl PathExtractionRequest {
    /// Build from raw `(lo, hi)` pairs.
    pub fn new(
        location: FileLocation,
        ranges: &[(usize, usize)],
        grid_hash: Option<String>,
    ) -> Result<Self, InvalidRangeError> {
        let (ranges, shape) = checked(range::validate(ranges)?)?;
        Ok(Self {
            location,
            ranges,
            grid_hash,
            shape,
        })
    }

    /// Where the field lives.
    pub fn location(&self) -> &FileLocation {
        &self.location
    }

    /// The same request with its grid hash removed.
    pub fn without_grid_hash(mut self) -> Self {
        self.grid_hash = None;
        self
    }
}

impl RangeRequest for PathExtractionRequest {
    fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn grid_hash(&self) -> Option<&str> {
        self.grid_hash.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RequestKey {
        RequestKey::builder()
            .select("class", "od")
            .select("step", "0")
            .build()
    }

    #[test]
    fn new_derives_shape_and_wire_ranges() {
        let req = ExtractionRequest::new(key(), &[(0, 49), (49, 50), (50, 100)], None).unwrap();
        assert_eq!(req.shape().lens(), &[49, 1, 50]);
        assert_eq!(req.flat_ranges(), vec![0, 49, 49, 50, 50, 100]);
        assert_eq!(req.serialized_key(), "class=od,step=0");
        assert_eq!(req.grid_hash(), None);
    }

    #[test]
    fn oversized_selections_are_rejected() {
        assert_eq!(
            ExtractionRequest::new(key(), &[(0, usize::MAX), (1, usize::MAX)], None),
            Err(InvalidRangeError::TotalOverflow { index: 1 })
        );
        let huge = vec![
            Range::new(0, usize::MAX).unwrap(),
            Range::new(0, usize::MAX).unwrap(),
        ];
        assert_eq!(
            ExtractionRequest::from_ranges(key(), huge, None),
            Err(InvalidRangeError::TotalOverflow { index: 1 })
        );
    }

    #[test]
    fn new_rejects_empty_and_inverted() {
        assert_eq!(
            ExtractionRequest::new(key(), &[], None),
            Err(InvalidRangeError::Empty)
        );
        assert!(matches!(
            ExtractionRequest::new(key(), &[(3, 3)], None),
            Err(InvalidRangeError::Inverted { .. })
        ));
    }

    #[test]
    fn indices_and_ranges_paths_agree() {
        let a = ExtractionRequest::from_indices(key(), &[10, 20, 30], None).unwrap();
        let b = ExtractionRequest::new(key(), &[(10, 11), (20, 21), (30, 31)], None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.indices(), vec![10, 20, 30]);
    }

    #[test]
    fn mask_path_rejects_all_false() {
        assert_eq!(
            ExtractionRequest::from_mask(key(), &[false; 10], None),
            Err(InvalidRangeError::EmptyMask)
        );
        let req = ExtractionRequest::from_mask(key(), &[true, true, false, true], None).unwrap();
        assert_eq!(req.flat_ranges(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn tuple_conversions() {
        let req = ExtractionRequest::try_from((key(), vec![(0, 6)])).unwrap();
        assert_eq!(req.shape().total(), 6);
        let hashed =
            ExtractionRequest::try_from((key(), vec![(0, 6)], Some("abc".to_string()))).unwrap();
        assert_eq!(hashed.grid_hash(), Some("abc"));
        assert_eq!(hashed.without_grid_hash().grid_hash(), None);
    }

    #[test]
    fn retrieve_string_prefixes_verb() {
        let key = RequestKey::builder()
            .select("class", "od")
            .select_many("step", ["0", "1"])
            .build();
        let req = ExtractionRequest::new(key, &[(0, 1)], None).unwrap();
        assert_eq!(req.retrieve_string(), "retrieve,class=od,step=0/1");
    }

    #[test]
    fn path_request_shares_shape_contract() {
        let req = PathExtractionRequest::new(
            FileLocation::local("/data/fc.grib", 4096),
            &[(0, 10), (20, 25)],
            None,
        )
        .unwrap();
        assert_eq!(req.shape().lens(), &[10, 5]);
        assert_eq!(req.location().scheme, "file");
        assert_eq!(req.location().offset, 4096);
        assert!(PathExtractionRequest::new(FileLocation::local("x", 0), &[], None).is_err());
    }
}
