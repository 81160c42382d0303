//! Typed errors for the safe facade.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::Location;

use log::trace;
use vision_boundary_core::{StatusCode, TaggedResult};

/// Failure of one boundary call, as seen by a Rust caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("native enum value has no boundary mapping")]
    EnumNotMatched,
    #[error("callback signaled failure")]
    CallbackFailed,
    #[error("name not found: {0}")]
    NameNotFound(String),
    #[error("null or consumed handle")]
    NullArgument,
    /// SDK-documented exception. Empty when the call has no description
    /// buffer.
    #[error("SDK exception: {0}")]
    KnownException(String),
    #[error("SDK returned an invalid result")]
    InvalidResult,
    #[error("unknown exception")]
    UnknownException,
    #[error("node {0} has a different type")]
    WrongNodeType(String),
    #[error("text contains a NUL byte: {0:?}")]
    InteriorNul(String),
    #[error("SDK text is not UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::EnumNotMatched => Error::EnumNotMatched,
            StatusCode::CallbackFailed => Error::CallbackFailed,
            StatusCode::NameNotFound => Error::NameNotFound(String::new()),
            StatusCode::NullArgument | StatusCode::Ok => Error::NullArgument,
            StatusCode::KnownException => Error::KnownException(String::new()),
            StatusCode::InvalidResult => Error::InvalidResult,
            StatusCode::UnknownException => Error::UnknownException,
        }
    }

    /// Attach the looked-up name to a [`Error::NameNotFound`].
    pub(crate) fn named(self, name: &str) -> Self {
        match self {
            Error::NameNotFound(_) => Error::NameNotFound(name.to_string()),
            other => other,
        }
    }
}

/// Unpack a tagged result, logging the call site.
#[track_caller]
pub(crate) fn check<T>(result: TaggedResult<T>) -> Result<T> {
    let at = Location::caller();
    trace!("boundary call at {}:{}: {:?}", at.file(), at.line(), result.status);
    if result.is_unknown_exception != 0 {
        return Err(Error::UnknownException);
    }
    match result.status {
        StatusCode::Ok if result.is_known_exception == 0 => Ok(result.payload),
        StatusCode::Ok => Err(Error::KnownException(String::new())),
        status => Err(Error::from_status(status)),
    }
}

/// [`check`] for calls that copy a known exception's description into
/// `description`.
#[track_caller]
pub(crate) fn check_described<T>(result: TaggedResult<T>, description: &[c_char]) -> Result<T> {
    match check(result) {
        Err(Error::KnownException(_)) => {
            let text = if description.contains(&0) {
                // Safety: the buffer holds a terminator.
                unsafe { CStr::from_ptr(description.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            } else {
                String::new()
            };
            Err(Error::KnownException(text))
        }
        other => other,
    }
}
