//! Payload types carried inside a [`TaggedResult`](crate::TaggedResult).

use std::ptr;

/// Value stored in a tagged result's payload slot when the call failed.
pub trait Sentinel: Copy {
    fn sentinel() -> Self;
}

macro_rules! zero_sentinel {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sentinel for $t {
                #[inline]
                fn sentinel() -> Self {
                    0 as $t
                }
            }
        )*
    };
}

zero_sentinel!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);

impl Sentinel for bool {
    #[inline]
    fn sentinel() -> Self {
        false
    }
}

impl<T> Sentinel for *mut T {
    #[inline]
    fn sentinel() -> Self {
        ptr::null_mut()
    }
}

impl<T> Sentinel for *const T {
    #[inline]
    fn sentinel() -> Self {
        ptr::null()
    }
}

/// Payload of operations that return nothing.
pub type Done = u8;

/// Success payload of a [`Done`] operation.
pub const DONE: Done = 1;

/// Inclusive value range reported by integer and float parameter nodes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: Sentinel> Sentinel for ValueRange<T> {
    fn sentinel() -> Self {
        ValueRange {
            min: T::sentinel(),
            max: T::sentinel(),
        }
    }
}
