//! Opaque handle lifecycle.
//!
//! A handle is the address of a boxed Rust value. Whoever most recently
//! received it from a constructor owns it until it is passed to exactly one
//! destructor. These helpers never dereference a null handle: null is
//! reported as [`Fault::NullArgument`].

use std::ptr;

use crate::status::Fault;

/// Move `value` to the heap and hand out its address. Never null.
pub fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

/// Borrow the value behind a handle.
///
/// # Safety
/// `handle` must be null or a live handle produced by [`into_handle`] for `T`.
pub unsafe fn borrow<'a, T>(handle: *const T) -> Result<&'a T, Fault> {
    handle.as_ref().ok_or(Fault::NullArgument)
}

/// Mutably borrow the value behind a handle.
///
/// # Safety
/// As for [`borrow`]; additionally no other reference to the value may be live.
pub unsafe fn borrow_mut<'a, T>(handle: *mut T) -> Result<&'a mut T, Fault> {
    handle.as_mut().ok_or(Fault::NullArgument)
}

/// Destroy the value behind a handle. Null is rejected without side effects.
///
/// # Safety
/// `handle` must be null or a live handle produced by [`into_handle`] for `T`
/// that is not used again afterwards.
pub unsafe fn release<T>(handle: *mut T) -> Result<(), Fault> {
    if handle.is_null() {
        return Err(Fault::NullArgument);
    }
    drop(Box::from_raw(handle));
    Ok(())
}

/// Take ownership of the handle stored in `slot`, nulling the slot.
///
/// The slot is null afterwards on every path, so a caller who later passes
/// its stale copy to a destructor gets `NullArgument` instead of a double
/// free.
///
/// # Safety
/// `slot` must be null or valid for reads and writes; its content must be
/// null or a live handle produced by [`into_handle`] for `T`.
pub unsafe fn take_slot<T>(slot: *mut *mut T) -> Result<Box<T>, Fault> {
    let slot = slot.as_mut().ok_or(Fault::NullArgument)?;
    let raw = std::mem::replace(slot, ptr::null_mut());
    if raw.is_null() {
        return Err(Fault::NullArgument);
    }
    Ok(Box::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn tracked(live: &Arc<AtomicUsize>) -> Tracked {
        live.fetch_add(1, Ordering::SeqCst);
        Tracked(live.clone())
    }

    #[test]
    fn construct_then_release_does_not_leak() {
        let live = Arc::new(AtomicUsize::new(0));
        let h = into_handle(tracked(&live));
        assert_eq!(live.load(Ordering::SeqCst), 1);
        unsafe { release(h) }.unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_is_never_dereferenced() {
        assert_eq!(
            unsafe { borrow::<u32>(ptr::null()) }.unwrap_err(),
            Fault::NullArgument
        );
        assert_eq!(
            unsafe { borrow_mut::<u32>(ptr::null_mut()) }.unwrap_err(),
            Fault::NullArgument
        );
        assert_eq!(
            unsafe { release::<u32>(ptr::null_mut()) }.unwrap_err(),
            Fault::NullArgument
        );
    }

    #[test]
    fn take_slot_nulls_the_slot() {
        let live = Arc::new(AtomicUsize::new(0));
        let mut slot = into_handle(tracked(&live));
        let taken = unsafe { take_slot(&mut slot) }.unwrap();
        assert!(slot.is_null());
        drop(taken);
        assert_eq!(live.load(Ordering::SeqCst), 0);

        // The stale slot is now a detectable error, not a double free.
        assert_eq!(
            unsafe { take_slot(&mut slot) }.unwrap_err(),
            Fault::NullArgument
        );
        assert_eq!(unsafe { release(slot) }.unwrap_err(), Fault::NullArgument);
    }

    #[test]
    fn take_slot_rejects_null_slot_pointer() {
        let err = unsafe { take_slot::<u8>(ptr::null_mut()) }.unwrap_err();
        assert_eq!(err, Fault::NullArgument);
    }
}
