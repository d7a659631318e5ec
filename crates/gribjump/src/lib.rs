//! GribJump: extract selected values from archived meteorological fields
//! without decoding whole fields on the client.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the GribJump sub-crates. For most users, adding `gribjump` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use gribjump::prelude::*;
//! use gribjump::types::range;
//!
//! // Select the valid points of a field from its validity mask.
//! let mut mask = vec![false; 100];
//! for i in [0, 3, 4, 99] {
//!     mask[i] = true;
//! }
//! let ranges = range::from_mask(&mask).unwrap();
//! assert_eq!(range::format_ranges(&ranges), "0-1,3-5,99-100");
//!
//! let key = RequestKey::builder()
//!     .select("class", "od")
//!     .select("step", "0")
//!     .build();
//! let request = ExtractionRequest::from_ranges(key, ranges, None).unwrap();
//! assert_eq!(request.shape().lens(), &[1, 2, 1]);
//!
//! // An engine answers with flat buffers; the result cuts them per range.
//! let raw = BufferedResult::new(vec![0.0, 3.0, 4.0, 99.0], vec![1, 0b11, 1]);
//! let result = ExtractionResult::new(Box::new(raw), request.shape().clone());
//! assert_eq!(result.values().unwrap()[1], &[3.0, 4.0]);
//! assert_eq!(result.count_valid().unwrap(), 4);
//! ```
//!
//! Extraction against an archive goes through [`GribJump`](prelude::GribJump),
//! constructed with an [`Engine`](prelude::Engine) implementation.
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gribjump-core` | Ranges, keys, requests, errors, status codes |
//! | [`result`] | `gribjump-result` | Lazily decoded results and packed-mask helpers |
//! | [`client`] | `gribjump-client` | Engine trait, client handle, iterator, axes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Ranges, request keys, requests, and errors (`gribjump-core`).
///
/// The range algorithms live in [`types::range`].
pub use gribjump_core as types;

/// Result decoding (`gribjump-result`).
///
/// [`result::ExtractionResult`] offers borrowed views and owned copies;
/// [`result::bitmask`] packs and unpacks validity masks.
pub use gribjump_result as result;

/// The extraction client (`gribjump-client`).
///
/// [`client::GribJump`] over an [`client::Engine`], returning an
/// [`client::ExtractionIterator`].
pub use gribjump_client as client;

/// Common imports for typical GribJump usage.
///
/// ```rust
/// use gribjump::prelude::*;
/// ```
pub mod prelude {
    // Requests
    pub use gribjump_core::{
        ExtractionRequest, FileLocation, PathExtractionRequest, Range, RangeRequest, RequestKey,
        Shape,
    };

    // Errors
    pub use gribjump_core::{EngineError, EngineStatus, InvalidRangeError, ShapeMismatchError};
    pub use gribjump_result::DecodeError;

    // Results
    pub use gribjump_result::{BufferedResult, ExtractionResult, RawResult};

    // Client
    pub use gribjump_client::{
        AxesMap, ClientConfig, Engine, ExtractionIterator, GribJump, GribJumpError,
        RequestContext, ResultSource,
    };
}
