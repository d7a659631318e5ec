//! Engine status codes.
//!
//! [`EngineStatus`] is a `repr(i32)` enum covering the status values an
//! extraction engine reports across the boundary. `Success` = 0 and
//! `Complete` = 1 are the only non-failure codes; all failures are negative.
//! Values are ABI-stable.

/// Status code reported by an extraction engine call.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// The call succeeded.
    Success = 0,
    /// The result sequence is exhausted (iterator advance only).
    Complete = 1,
    /// Unspecified engine-side failure.
    Failure = -1,
    /// No archived field matches the request key.
    NotFound = -2,
    /// A request or argument was rejected by the engine.
    InvalidArgument = -3,
    /// A requested range extends past the end of the field.
    OutOfRange = -4,
    /// The grid hash supplied with the request does not match the field.
    GridHashMismatch = -5,
    /// The handle is invalid or was already released.
    InvalidHandle = -6,
    /// The engine failed while reading or decoding archived data.
    DecodeFailed = -7,
}

impl EngineStatus {
    /// Map a raw status code back to a known status, if it is one.
    pub fn from_code(code: i32) -> Option<Self> {
        let status = match code {
            0 => Self::Success,
            1 => Self::Complete,
            -1 => Self::Failure,
            -2 => Self::NotFound,
            -3 => Self::InvalidArgument,
            -4 => Self::OutOfRange,
            -5 => Self::GridHashMismatch,
            -6 => Self::InvalidHandle,
            -7 => Self::DecodeFailed,
            _ => return None,
        };
        Some(status)
    }

    /// The raw code for this status.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this status signals a failure.
    pub fn is_failure(self) -> bool {
        (self as i32) < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(EngineStatus::Success as i32, 0);
        assert_eq!(EngineStatus::Complete as i32, 1);
        assert_eq!(EngineStatus::Failure as i32, -1);
        assert_eq!(EngineStatus::NotFound as i32, -2);
        assert_eq!(EngineStatus::InvalidArgument as i32, -3);
        assert_eq!(EngineStatus::OutOfRange as i32, -4);
        assert_eq!(EngineStatus::GridHashMismatch as i32, -5);
        assert_eq!(EngineStatus::InvalidHandle as i32, -6);
        assert_eq!(EngineStatus::DecodeFailed as i32, -7);
    }

    #[test]
    fn from_code_round_trips_known_codes() {
        for code in -7..=1 {
            let status = EngineStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(EngineStatus::from_code(-99), None);
        assert_eq!(EngineStatus::from_code(2), None);
    }

    #[test]
    fn only_negative_codes_are_failures() {
        assert!(!EngineStatus::Success.is_failure());
        assert!(!EngineStatus::Complete.is_failure());
        assert!(EngineStatus::NotFound.is_failure());
        assert!(EngineStatus::DecodeFailed.is_failure());
    }
}
