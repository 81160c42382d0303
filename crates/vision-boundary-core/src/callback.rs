//! Enumerate-with-callback loops.
//!
//! Enumerate-style boundary functions take a callback plus an opaque
//! `user_data` pointer and call it once per element. A non-zero return from
//! the callback stops the loop and the call reports
//! [`Fault::CallbackFailed`].

use std::os::raw::c_void;

use crate::status::Fault;

/// Callback invoked once per enumerated element.
///
/// Returning non-zero stops the enumeration.
pub type ItemCallback<T> = unsafe extern "C" fn(user_data: *mut c_void, item: T) -> u8;

/// Reject a missing callback before any SDK work is done.
pub fn require<F>(callback: Option<F>) -> Result<F, Fault> {
    callback.ok_or(Fault::NullArgument)
}

/// Hand each item to `invoke` until it returns non-zero.
///
/// Returns the number of items delivered on success.
pub fn for_each_until_failure<I, F>(items: I, mut invoke: F) -> Result<usize, Fault>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<u8, Fault>,
{
    let mut delivered = 0;
    for item in items {
        delivered += 1;
        if invoke(item)? != 0 {
            return Err(Fault::CallbackFailed);
        }
    }
    Ok(delivered)
}
