//! Native <-> boundary enumeration tables.
//!
//! Native SDK enumeration values are not stable across SDK releases, so the
//! boundary owns its own integer encoding. Every native constant that may
//! cross must be an explicit row of a table; anything else is
//! [`Fault::EnumNotMatched`], never a pass-through.

use std::fmt::Debug;

use crate::status::Fault;

/// An enumeration with a fixed boundary encoding and an explicit mapping
/// table to the native SDK's values.
pub trait BoundaryEnum: Copy + Eq + Debug + 'static {
    /// Native SDK value type (usually a `native_code!` newtype).
    type Native: Copy + Eq + Debug + Into<i64> + 'static;

    /// One row per supported native constant.
    const TABLE: &'static [(Self::Native, Self)];

    /// Boundary-stable integer encoding.
    fn code(self) -> i32;

    fn from_code(code: i32) -> Option<Self>;

    fn from_native(native: Self::Native) -> Result<Self, Fault> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == native)
            .map(|(_, b)| *b)
            .ok_or_else(|| Fault::EnumNotMatched(native.into()))
    }

    fn to_native(self) -> Result<Self::Native, Fault> {
        Self::TABLE
            .iter()
            .find(|(_, b)| *b == self)
            .map(|(n, _)| *n)
            .ok_or(Fault::EnumNotMatched(i64::from(self.code())))
    }
}

/// Declare a newtype for raw native enumeration values.
#[macro_export]
macro_rules! native_code {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $name(pub $inner);

        impl From<$name> for i64 {
            fn from(v: $name) -> i64 {
                v.0 as i64
            }
        }
    };
}

/// Declare a boundary enumeration together with its native mapping table.
///
/// ```
/// use vision_boundary_core::{boundary_enum, native_code, BoundaryEnum};
///
/// native_code! {
///     pub struct NativeColor(u32);
/// }
///
/// boundary_enum! {
///     /// Colors known to the boundary.
///     pub enum Color: i8 => NativeColor {
///         Red = 0 => NativeColor(0xff0000),
///         Green = 1 => NativeColor(0x00ff00),
///     }
///     sentinel = Red;
/// }
///
/// assert_eq!(Color::from_native(NativeColor(0x00ff00)).unwrap(), Color::Green);
/// assert!(Color::from_native(NativeColor(0x0000ff)).is_err());
/// ```
#[macro_export]
macro_rules! boundary_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident => $native:ty {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:expr => $native_value:expr
            ),+ $(,)?
        }
        sentinel = $sentinel:ident;
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            /// Every boundary value, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];
        }

        impl $crate::BoundaryEnum for $name {
            type Native = $native;

            const TABLE: &'static [($native, $name)] = &[
                $( ($native_value, $name::$variant) ),+
            ];

            fn code(self) -> i32 {
                self as $repr as i32
            }

            fn from_code(code: i32) -> Option<Self> {
                $name::ALL.iter().copied().find(|v| (*v as $repr as i32) == code)
            }
        }

        impl $crate::Sentinel for $name {
            fn sentinel() -> Self {
                $name::$sentinel
            }
        }
    };
}
