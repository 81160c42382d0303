use vision_boundary_core::{boundary_enum, Fault};

use crate::sdk::{NativeCalibFlags, NativePoseMethod};

boundary_enum! {
    /// Pose solver requested by the caller.
    pub enum PoseMethod: i32 => NativePoseMethod {
        /// Infinitesimal plane-based pose estimation. Object points must be
        /// coplanar.
        Ippe = 0 => NativePoseMethod(6),
        /// Efficient perspective-n-point.
        Epnp = 1 => NativePoseMethod(1),
    }
    sentinel = Ippe;
}

/// Boundary bitset of calibration options.
///
/// The bit layout is owned by the boundary; [`CalibFlags::to_native`] maps
/// it onto the SDK's flag word.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CalibFlags(pub u32);

impl CalibFlags {
    pub const NONE: CalibFlags = CalibFlags(0);
    pub const FIX_K3: CalibFlags = CalibFlags(1 << 0);
    pub const FIX_K4: CalibFlags = CalibFlags(1 << 1);
    pub const FIX_K5: CalibFlags = CalibFlags(1 << 2);
    pub const FIX_K6: CalibFlags = CalibFlags(1 << 3);

    const TABLE: [(CalibFlags, NativeCalibFlags); 4] = [
        (CalibFlags::FIX_K3, NativeCalibFlags(128)),
        (CalibFlags::FIX_K4, NativeCalibFlags(2048)),
        (CalibFlags::FIX_K5, NativeCalibFlags(4096)),
        (CalibFlags::FIX_K6, NativeCalibFlags(8192)),
    ];

    /// Mask of every bit with a native mapping.
    pub const KNOWN: CalibFlags = CalibFlags(0b1111);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: CalibFlags) -> CalibFlags {
        CalibFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: CalibFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Translate into the SDK's flag word. Bits without a mapping are
    /// rejected rather than passed through.
    pub fn to_native(self) -> Result<NativeCalibFlags, Fault> {
        let unknown = self.0 & !Self::KNOWN.0;
        if unknown != 0 {
            return Err(Fault::EnumNotMatched(i64::from(unknown)));
        }
        let word = Self::TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .fold(0, |acc, (_, native)| acc | native.0);
        Ok(NativeCalibFlags(word))
    }

    /// Inverse of [`CalibFlags::to_native`].
    pub fn from_native(native: NativeCalibFlags) -> Result<CalibFlags, Fault> {
        let mut flags = CalibFlags::NONE;
        let mut rest = native.0;
        for (flag, bit) in Self::TABLE {
            if native.0 & bit.0 != 0 {
                flags = flags.union(flag);
                rest &= !bit.0;
            }
        }
        if rest != 0 {
            return Err(Fault::EnumNotMatched(i64::from(rest)));
        }
        Ok(flags)
    }
}

/// Fixes the higher radial terms, as the ROS mono calibrator does.
impl Default for CalibFlags {
    fn default() -> Self {
        CalibFlags::FIX_K3
            .union(CalibFlags::FIX_K4)
            .union(CalibFlags::FIX_K5)
            .union(CalibFlags::FIX_K6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision_boundary_core::BoundaryEnum;

    #[test]
    fn pose_method_table() {
        assert_eq!(PoseMethod::Ippe.to_native().unwrap(), NativePoseMethod(6));
        assert_eq!(
            PoseMethod::from_native(NativePoseMethod(1)).unwrap(),
            PoseMethod::Epnp
        );
        assert_eq!(
            PoseMethod::from_native(NativePoseMethod(0)).unwrap_err(),
            Fault::EnumNotMatched(0)
        );
        assert_eq!(PoseMethod::from_code(2), None);
    }

    #[test]
    fn default_flags_fix_k3_to_k6() {
        let native = CalibFlags::default().to_native().unwrap();
        assert_eq!(native, NativeCalibFlags(128 | 2048 | 4096 | 8192));
        assert_eq!(CalibFlags::from_native(native).unwrap(), CalibFlags::default());
    }

    #[test]
    fn partial_flags() {
        let flags = CalibFlags::FIX_K3.union(CalibFlags::FIX_K5);
        assert_eq!(flags.to_native().unwrap(), NativeCalibFlags(128 | 4096));
        assert_eq!(CalibFlags::NONE.to_native().unwrap(), NativeCalibFlags(0));
    }

    #[test]
    fn unmapped_bits_are_rejected() {
        assert_eq!(
            CalibFlags(0b1_0001).to_native().unwrap_err(),
            Fault::EnumNotMatched(0b1_0000)
        );
        assert_eq!(
            CalibFlags::from_native(NativeCalibFlags(128 | 1)).unwrap_err(),
            Fault::EnumNotMatched(1)
        );
    }
}
