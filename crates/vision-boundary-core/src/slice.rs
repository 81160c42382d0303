//! Zero-copy views of SDK-owned memory.

use crate::payload::Sentinel;

/// Read-only pointer + element count view into SDK-owned memory.
///
/// The caller never owns the memory. The view is valid only while the
/// handle it was derived from is alive and the producing call has not been
/// issued again.
#[repr(C)]
#[derive(Debug)]
pub struct BorrowedSlice<T> {
    pub ptr: *const T,
    pub len: usize,
}

impl<T> Clone for BorrowedSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BorrowedSlice<T> {}

impl<T> BorrowedSlice<T> {
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            ptr: data.as_ptr(),
            len: data.len(),
        }
    }

    pub fn empty() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// View the borrowed memory. A null view reads as empty.
    ///
    /// # Safety
    /// The source object must still be alive and unchanged for `'a`.
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        if self.ptr.is_null() {
            &[]
        } else {
            std::slice::from_raw_parts(self.ptr, self.len)
        }
    }
}

impl<T> Sentinel for BorrowedSlice<T> {
    fn sentinel() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matches_source_length() {
        let pixels = vec![7u8; 640 * 4];
        let view = BorrowedSlice::from_slice(&pixels);
        assert_eq!(view.len, pixels.len());
        assert_eq!(unsafe { view.as_slice() }, pixels.as_slice());
    }

    #[test]
    fn sentinel_reads_empty() {
        let view = BorrowedSlice::<f32>::sentinel();
        assert!(view.is_null());
        assert!(unsafe { view.as_slice() }.is_empty());
    }
}
