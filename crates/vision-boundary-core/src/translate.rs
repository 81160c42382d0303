//! Fallible-call translator.
//!
//! Every boundary function funnels its work through one of these helpers so
//! that nothing (neither an SDK error nor a panic) escapes into the caller's
//! runtime.

use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};

use crate::payload::{Done, Sentinel, DONE};
use crate::status::{Fault, SdkError, StatusCode, TaggedResult};
use crate::text::copy_to_c_buffer;

/// Run one operation and tag its outcome.
///
/// A panic unwinding out of `op` is reported as an unknown exception.
pub fn translate<T, F>(op: F) -> TaggedResult<T>
where
    T: Sentinel,
    F: FnOnce() -> Result<T, Fault>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => TaggedResult::success(value),
        Ok(Err(fault)) => TaggedResult::from_fault(&fault),
        Err(_) => TaggedResult::failure(StatusCode::UnknownException),
    }
}

/// [`translate`] for operations without a value.
pub fn translate_unit<F>(op: F) -> TaggedResult<Done>
where
    F: FnOnce() -> Result<(), Fault>,
{
    translate(|| op().map(|()| DONE))
}

/// [`translate`], additionally copying the description of a known SDK
/// exception into the caller's buffer.
///
/// The buffer is left untouched on every other path. A null `dest` or a
/// zero `capacity` skips the copy.
///
/// # Safety
/// `dest` must be null or valid for writes of `capacity` bytes.
pub unsafe fn translate_described<T, F>(dest: *mut c_char, capacity: usize, op: F) -> TaggedResult<T>
where
    T: Sentinel,
    F: FnOnce() -> Result<T, Fault>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => TaggedResult::success(value),
        Ok(Err(fault)) => {
            if let Fault::Sdk(SdkError::Known { description }) = &fault {
                if !dest.is_null() {
                    // The status already says what happened; a failed copy
                    // must not turn it into a different failure.
                    let _ = copy_to_c_buffer(description, dest, capacity);
                }
            }
            TaggedResult::from_fault(&fault)
        }
        Err(_) => TaggedResult::failure(StatusCode::UnknownException),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn success_carries_value() {
        let r = translate(|| Ok(42.5_f64));
        assert!(r.is_ok());
        assert_eq!(r.payload, 42.5);
    }

    #[test]
    fn known_exception_sets_only_known_flag() {
        let r: TaggedResult<f64> = translate(|| Err(SdkError::known("device busy").into()));
        assert_eq!(r.is_known_exception, 1);
        assert_eq!(r.is_unknown_exception, 0);
        assert_eq!(r.status, StatusCode::KnownException);
        assert_eq!(r.payload, 0.0);
    }

    #[test]
    fn panic_becomes_unknown_exception() {
        let r: TaggedResult<i64> = translate(|| panic!("backend blew up"));
        assert_eq!(r.is_known_exception, 0);
        assert_eq!(r.is_unknown_exception, 1);
        assert_eq!(r.payload, 0);
    }

    #[test]
    fn non_exception_faults_keep_flags_clear() {
        let r: TaggedResult<u32> = translate(|| Err(Fault::NameNotFound("Gain".into())));
        assert_eq!((r.is_known_exception, r.is_unknown_exception), (0, 0));
        assert_eq!(r.status, StatusCode::NameNotFound);
    }

    #[test]
    fn described_copies_known_description() {
        let mut buf = [0 as c_char; 16];
        let r: TaggedResult<u8> = unsafe {
            translate_described(buf.as_mut_ptr(), buf.len(), || {
                Err(SdkError::known("the device is already open").into())
            })
        };
        assert_eq!(r.status, StatusCode::KnownException);
        let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(text.to_str().unwrap(), "the device is a");
    }

    #[test]
    fn described_leaves_buffer_alone_on_unknown() {
        let mut buf = [b'x' as c_char; 4];
        let r: TaggedResult<u8> = unsafe {
            translate_described(buf.as_mut_ptr(), buf.len(), || Err(SdkError::Unknown.into()))
        };
        assert_eq!(r.is_unknown_exception, 1);
        assert!(buf.iter().all(|&c| c == b'x' as c_char));
    }

    #[test]
    fn unit_success_payload_is_done() {
        let r = translate_unit(|| Ok(()));
        assert!(r.is_ok());
        assert_eq!(r.payload, DONE);
    }
}
