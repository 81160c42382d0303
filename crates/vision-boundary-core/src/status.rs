//! Status codes, fault taxonomy and the tagged result record.

use crate::payload::Sentinel;

/// Boundary-stable status discriminant.
///
/// The numeric values are part of the ABI and never change. New failure
/// categories are appended, never inserted.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok = 0,
    /// The SDK returned an enumeration value with no boundary mapping.
    EnumNotMatched = 1,
    /// A caller-supplied callback returned non-zero.
    CallbackFailed = 2,
    /// A lookup by name (parameter, property) found nothing.
    NameNotFound = 3,
    /// A null or already-consumed handle/pointer was passed in.
    NullArgument = 4,
    /// The SDK raised one of its own documented exceptions.
    KnownException = 5,
    /// A call documented as infallible produced a sentinel value.
    InvalidResult = 6,
    /// Anything else, including panics unwinding out of a backend.
    UnknownException = 7,
}

impl StatusCode {
    pub const ALL: [StatusCode; 8] = [
        StatusCode::Ok,
        StatusCode::EnumNotMatched,
        StatusCode::CallbackFailed,
        StatusCode::NameNotFound,
        StatusCode::NullArgument,
        StatusCode::KnownException,
        StatusCode::InvalidResult,
        StatusCode::UnknownException,
    ];

    /// Numeric value as seen by the foreign caller.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

/// Failure reported by an SDK backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// One of the SDK's own documented exception types.
    #[error("SDK exception: {description}")]
    Known { description: String },
    /// Anything the SDK did not document.
    #[error("unknown exception")]
    Unknown,
}

impl SdkError {
    pub fn known(description: impl Into<String>) -> Self {
        SdkError::Known {
            description: description.into(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

/// Everything that can go wrong inside one boundary call.
///
/// Each variant maps onto exactly one [`StatusCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("null argument")]
    NullArgument,
    #[error("name not found: {0}")]
    NameNotFound(String),
    #[error("native enum value {0} has no boundary mapping")]
    EnumNotMatched(i64),
    #[error("callback signaled failure")]
    CallbackFailed,
    #[error("invalid result from {0}")]
    InvalidResult(&'static str),
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl Fault {
    pub fn status(&self) -> StatusCode {
        match self {
            Fault::NullArgument => StatusCode::NullArgument,
            Fault::NameNotFound(_) => StatusCode::NameNotFound,
            Fault::EnumNotMatched(_) => StatusCode::EnumNotMatched,
            Fault::CallbackFailed => StatusCode::CallbackFailed,
            Fault::InvalidResult(_) => StatusCode::InvalidResult,
            Fault::Sdk(SdkError::Known { .. }) => StatusCode::KnownException,
            Fault::Sdk(SdkError::Unknown) => StatusCode::UnknownException,
        }
    }
}

/// Outcome of one fallible boundary call.
///
/// When both exception flags are zero and `status` is [`StatusCode::Ok`],
/// `payload` holds the operation's value. Otherwise `payload` is the
/// type's sentinel and must not be read.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TaggedResult<T> {
    pub is_known_exception: u8,
    pub is_unknown_exception: u8,
    pub status: StatusCode,
    pub payload: T,
}

impl<T: Sentinel> TaggedResult<T> {
    pub fn success(payload: T) -> Self {
        Self {
            is_known_exception: 0,
            is_unknown_exception: 0,
            status: StatusCode::Ok,
            payload,
        }
    }

    /// A failed result for `status`; the exception flags follow the status.
    pub fn failure(status: StatusCode) -> Self {
        Self {
            is_known_exception: u8::from(status == StatusCode::KnownException),
            is_unknown_exception: u8::from(status == StatusCode::UnknownException),
            status,
            payload: T::sentinel(),
        }
    }

    pub fn from_fault(fault: &Fault) -> Self {
        Self::failure(fault.status())
    }

    /// `true` when the payload may be read.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.is_known_exception == 0
            && self.is_unknown_exception == 0
            && self.status == StatusCode::Ok
    }

    pub fn into_result(self) -> Result<T, StatusCode> {
        if self.is_ok() {
            Ok(self.payload)
        } else if self.is_known_exception != 0 {
            Err(StatusCode::KnownException)
        } else if self.is_unknown_exception != 0 {
            Err(StatusCode::UnknownException)
        } else {
            Err(self.status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_dense_and_stable() {
        for (i, status) in StatusCode::ALL.iter().enumerate() {
            assert_eq!(status.code(), i as i32);
            assert_eq!(StatusCode::from_code(i as i32), Some(*status));
        }
        assert_eq!(StatusCode::from_code(8), None);
        assert_eq!(StatusCode::from_code(-1), None);
    }

    #[test]
    fn exception_flags_follow_status() {
        let known = TaggedResult::<f64>::failure(StatusCode::KnownException);
        assert_eq!((known.is_known_exception, known.is_unknown_exception), (1, 0));

        let unknown = TaggedResult::<f64>::failure(StatusCode::UnknownException);
        assert_eq!(
            (unknown.is_known_exception, unknown.is_unknown_exception),
            (0, 1)
        );

        let null = TaggedResult::<f64>::failure(StatusCode::NullArgument);
        assert_eq!((null.is_known_exception, null.is_unknown_exception), (0, 0));
        assert_eq!(null.into_result(), Err(StatusCode::NullArgument));
    }

    #[test]
    fn false_payload_is_a_success() {
        let r = TaggedResult::success(false);
        assert!(r.is_ok());
        assert_eq!(r.into_result(), Ok(false));
    }

    #[test]
    fn fault_status_mapping() {
        assert_eq!(
            Fault::from(SdkError::known("boom")).status(),
            StatusCode::KnownException
        );
        assert_eq!(
            Fault::from(SdkError::Unknown).status(),
            StatusCode::UnknownException
        );
        assert_eq!(Fault::EnumNotMatched(7).status(), StatusCode::EnumNotMatched);
        assert_eq!(
            Fault::InvalidResult("width").status(),
            StatusCode::InvalidResult
        );
    }
}
