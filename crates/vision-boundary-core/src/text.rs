//! Text hand-off across the boundary.
//!
//! Two shapes are supported: a bounded copy into a caller-owned buffer, and
//! the owned [`BoundaryString`] handle for text whose length the caller
//! cannot know in advance.

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::handle;
use crate::payload::Done;
use crate::status::{Fault, TaggedResult};
use crate::translate::{translate, translate_unit};

/// Copy `text` into `dest`, writing at most `capacity` bytes including the
/// terminating NUL. The copy is truncated to fit, never inside a UTF-8
/// sequence, and is always terminated when `capacity > 0`.
///
/// # Safety
/// `dest` must be null or valid for writes of `capacity` bytes.
pub unsafe fn copy_to_c_buffer(text: &str, dest: *mut c_char, capacity: usize) -> Result<(), Fault> {
    if capacity == 0 {
        return Ok(());
    }
    if dest.is_null() {
        return Err(Fault::NullArgument);
    }
    let mut n = text.len().min(capacity - 1);
    while !text.is_char_boundary(n) {
        n -= 1;
    }
    std::ptr::copy_nonoverlapping(text.as_ptr(), dest.cast::<u8>(), n);
    *dest.add(n) = 0;
    Ok(())
}

/// Borrow a caller-supplied NUL-terminated string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn borrow_c_str<'a>(ptr: *const c_char) -> Result<Cow<'a, str>, Fault> {
    if ptr.is_null() {
        return Err(Fault::NullArgument);
    }
    Ok(CStr::from_ptr(ptr).to_string_lossy())
}

/// Build a `CString`, cutting `text` at its first interior NUL.
pub fn to_c_string(text: &str) -> CString {
    let head = text.split('\0').next().unwrap_or_default();
    CString::new(head).unwrap_or_default()
}

/// Owned, growable text handed to the foreign caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoundaryString {
    text: CString,
}

impl BoundaryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, text: &str) {
        self.text = to_c_string(text);
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.text
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        self.text.to_string_lossy()
    }

    pub fn len(&self) -> usize {
        self.text.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static LIVE_STRINGS: AtomicUsize = AtomicUsize::new(0);

/// Number of [`vb_string_new`] handles not yet released.
pub fn live_string_handles() -> usize {
    LIVE_STRINGS.load(Ordering::SeqCst)
}

/// Create an empty owned string.
#[no_mangle]
pub extern "C" fn vb_string_new() -> TaggedResult<*mut BoundaryString> {
    translate(|| {
        let string = handle::into_handle(BoundaryString::new());
        LIVE_STRINGS.fetch_add(1, Ordering::SeqCst);
        Ok(string)
    })
}

/// Release a string created by [`vb_string_new`].
///
/// # Safety
/// `string` must be null or a live handle from [`vb_string_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_string_delete(string: *mut BoundaryString) -> TaggedResult<Done> {
    translate_unit(|| {
        handle::release(string)?;
        LIVE_STRINGS.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    })
}

/// NUL-terminated contents, valid until the string is modified or released.
///
/// # Safety
/// `string` must be null or a live handle from [`vb_string_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_string_bytes(string: *const BoundaryString) -> TaggedResult<*const c_char> {
    translate(|| Ok(handle::borrow(string)?.as_c_str().as_ptr()))
}

/// Length in bytes, excluding the terminator.
///
/// # Safety
/// `string` must be null or a live handle from [`vb_string_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_string_len(string: *const BoundaryString) -> TaggedResult<usize> {
    translate(|| Ok(handle::borrow(string)?.len()))
}
