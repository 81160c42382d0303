use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use vision_boundary_core::text::{vb_string_bytes, vb_string_delete, vb_string_new};
use vision_boundary_core::{BoundaryString, TaggedResult};

use crate::error::{check, Result};

/// Read a text getter that follows the measure-then-copy convention.
pub(crate) fn read_text<F>(mut call: F) -> Result<String>
where
    F: FnMut(*mut c_char, usize) -> TaggedResult<usize>,
{
    let len = check(call(ptr::null_mut(), 0))?;
    let mut buf = vec![0 as c_char; len + 1];
    let full = check(call(buf.as_mut_ptr(), buf.len()))?;
    let bytes: Vec<u8> = buf[..len.min(full)].iter().map(|&c| c as u8).collect();
    Ok(std::str::from_utf8(&bytes)?.to_string())
}

/// Owned string handle released on drop.
pub(crate) struct OwnedString {
    raw: *mut BoundaryString,
}

impl OwnedString {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            raw: check(vb_string_new())?,
        })
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut BoundaryString {
        self.raw
    }

    pub(crate) fn contents(&self) -> Result<String> {
        // Safety: `raw` is live until drop; the bytes are copied out before
        // anything else touches the string.
        let bytes = check(unsafe { vb_string_bytes(self.raw) })?;
        Ok(unsafe { CStr::from_ptr(bytes) }.to_str()?.to_string())
    }
}

impl Drop for OwnedString {
    fn drop(&mut self) {
        // Safety: `raw` came from `vb_string_new` and is released only here.
        let _ = unsafe { vb_string_delete(self.raw) };
    }
}
