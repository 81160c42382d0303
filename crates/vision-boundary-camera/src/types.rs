//! Boundary enumerations of the camera SDK and their native tables.

use serde::{Deserialize, Serialize};
use vision_boundary_core::{boundary_enum, native_code, BoundaryEnum, Fault};

native_code! {
    /// GenICam `EInterfaceType` value.
    pub struct NativeInterfaceType(i32);
}

native_code! {
    /// GenICam `EVisibility` value.
    pub struct NativeVisibility(i32);
}

native_code! {
    /// Grab status as reported by the camera SDK.
    pub struct NativeGrabStatus(i32);
}

native_code! {
    pub struct NativePayloadType(i32);
}

native_code! {
    /// Pixel format code (GenICam PFNC layout, `-1` for undefined).
    pub struct NativePixelType(i64);
}

native_code! {
    /// Device access mode bitset in the camera SDK's own bit layout.
    pub struct NativeAccessModeSet(u64);
}

boundary_enum! {
    /// Principal interface of a parameter node.
    pub enum InterfaceType: i8 => NativeInterfaceType {
        IValue = 0 => NativeInterfaceType(0),
        IBase = 1 => NativeInterfaceType(1),
        IInteger = 2 => NativeInterfaceType(2),
        IBoolean = 3 => NativeInterfaceType(3),
        ICommand = 4 => NativeInterfaceType(4),
        IFloat = 5 => NativeInterfaceType(5),
        IString = 6 => NativeInterfaceType(6),
        IRegister = 7 => NativeInterfaceType(7),
        ICategory = 8 => NativeInterfaceType(8),
        IEnumeration = 9 => NativeInterfaceType(9),
        IEnumEntry = 10 => NativeInterfaceType(10),
        IPort = 11 => NativeInterfaceType(11),
    }
    sentinel = IValue;
}

boundary_enum! {
    /// Recommended audience of a parameter node.
    pub enum Visibility: i8 => NativeVisibility {
        Beginner = 0 => NativeVisibility(0),
        Expert = 1 => NativeVisibility(1),
        Guru = 2 => NativeVisibility(2),
        Invisible = 3 => NativeVisibility(3),
    }
    sentinel = Beginner;
}

boundary_enum! {
    pub enum GrabStatus: i8 => NativeGrabStatus {
        Undefined = -1 => NativeGrabStatus(-1),
        /// Not used by current SDKs.
        Idle = 0 => NativeGrabStatus(0),
        /// The request is in the input queue.
        Queued = 1 => NativeGrabStatus(1),
        /// The buffer is filled with data.
        Grabbed = 2 => NativeGrabStatus(2),
        /// The request was canceled; the buffer holds no valid data.
        Canceled = 3 => NativeGrabStatus(3),
        /// The request failed; the buffer holds no valid data.
        Failed = 4 => NativeGrabStatus(4),
    }
    sentinel = Undefined;
}

boundary_enum! {
    pub enum PayloadType: i32 => NativePayloadType {
        Undefined = -1 => NativePayloadType(-1),
        Image = 0 => NativePayloadType(0),
        RawData = 1 => NativePayloadType(1),
        File = 2 => NativePayloadType(2),
        ChunkData = 3 => NativePayloadType(3),
        GenDc = 4 => NativePayloadType(4),
        DeviceSpecific = 5 => NativePayloadType(0x8000),
    }
    sentinel = Undefined;
}

boundary_enum! {
    pub enum PixelType: i8 => NativePixelType {
        Undefined = -1 => NativePixelType(-1),
        Mono1packed = 0 => NativePixelType(0x8101_000c),
        Mono2packed = 1 => NativePixelType(0x8102_000d),
        Mono4packed = 2 => NativePixelType(0x8104_000e),
        Mono8 = 3 => NativePixelType(0x0108_0001),
        Mono8signed = 4 => NativePixelType(0x0108_0002),
        Mono10 = 5 => NativePixelType(0x0110_0003),
        Mono10packed = 6 => NativePixelType(0x010c_0004),
        Mono10p = 7 => NativePixelType(0x010a_0046),
        Mono12 = 8 => NativePixelType(0x0110_0005),
        Mono12packed = 9 => NativePixelType(0x010c_0006),
        Mono12p = 10 => NativePixelType(0x010c_0047),
        Mono16 = 11 => NativePixelType(0x0110_0007),
        BayerGR8 = 12 => NativePixelType(0x0108_0008),
        BayerRG8 = 13 => NativePixelType(0x0108_0009),
        BayerGB8 = 14 => NativePixelType(0x0108_000a),
        BayerBG8 = 15 => NativePixelType(0x0108_000b),
        BayerGR10 = 16 => NativePixelType(0x0110_000c),
        BayerRG10 = 17 => NativePixelType(0x0110_000d),
        BayerGB10 = 18 => NativePixelType(0x0110_000e),
        BayerBG10 = 19 => NativePixelType(0x0110_000f),
        BayerGR12 = 20 => NativePixelType(0x0110_0010),
        BayerRG12 = 21 => NativePixelType(0x0110_0011),
        BayerGB12 = 22 => NativePixelType(0x0110_0012),
        BayerBG12 = 23 => NativePixelType(0x0110_0013),
        RGB8packed = 24 => NativePixelType(0x0218_0014),
        BGR8packed = 25 => NativePixelType(0x0218_0015),
        RGBA8packed = 26 => NativePixelType(0x0220_0016),
        BGRA8packed = 27 => NativePixelType(0x0220_0017),
        RGB10packed = 28 => NativePixelType(0x0230_0018),
        BGR10packed = 29 => NativePixelType(0x0230_0019),
        RGB12packed = 30 => NativePixelType(0x0230_001a),
        BGR12packed = 31 => NativePixelType(0x0230_001b),
        RGB16packed = 32 => NativePixelType(0x0230_0033),
        BGR10V1packed = 33 => NativePixelType(0x0220_001c),
        BGR10V2packed = 34 => NativePixelType(0x0220_001d),
        YUV411packed = 35 => NativePixelType(0x020c_001e),
        YUV422packed = 36 => NativePixelType(0x0210_001f),
        YUV444packed = 37 => NativePixelType(0x0218_0020),
        RGB8planar = 38 => NativePixelType(0x0218_0021),
        RGB10planar = 39 => NativePixelType(0x0230_0022),
        RGB12planar = 40 => NativePixelType(0x0230_0023),
        RGB16planar = 41 => NativePixelType(0x0230_0024),
        YUV422YuyvPacked = 42 => NativePixelType(0x0210_0032),
        BayerGR12Packed = 43 => NativePixelType(0x010c_002a),
        BayerRG12Packed = 44 => NativePixelType(0x010c_002b),
        BayerGB12Packed = 45 => NativePixelType(0x010c_002c),
        BayerBG12Packed = 46 => NativePixelType(0x010c_002d),
        BayerGR10p = 47 => NativePixelType(0x010a_0056),
        BayerRG10p = 48 => NativePixelType(0x010a_0058),
        BayerGB10p = 49 => NativePixelType(0x010a_0054),
        BayerBG10p = 50 => NativePixelType(0x010a_0052),
        BayerGR12p = 51 => NativePixelType(0x010c_0057),
        BayerRG12p = 52 => NativePixelType(0x010c_0059),
        BayerGB12p = 53 => NativePixelType(0x010c_0055),
        BayerBG12p = 54 => NativePixelType(0x010c_0053),
        BayerGR16 = 55 => NativePixelType(0x0110_002e),
        BayerRG16 = 56 => NativePixelType(0x0110_002f),
        BayerGB16 = 57 => NativePixelType(0x0110_0030),
        BayerBG16 = 58 => NativePixelType(0x0110_0031),
        RGB12V1packed = 59 => NativePixelType(0x0224_0034),
        Double = 60 => NativePixelType(0x8140_0100),
    }
    sentinel = Undefined;
}

impl PixelType {
    /// Bits per pixel encoded in the PFNC code, `None` for `Undefined`.
    pub fn bits_per_pixel(self) -> Option<u32> {
        match self.to_native() {
            Ok(NativePixelType(code)) if code >= 0 => Some(((code >> 16) & 0xff) as u32),
            _ => None,
        }
    }
}

/// Boundary bitset of device access modes.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessModeSet(pub u32);

impl AccessModeSet {
    pub const NONE: AccessModeSet = AccessModeSet(0);
    pub const CONTROL: AccessModeSet = AccessModeSet(1 << 0);
    pub const STREAM: AccessModeSet = AccessModeSet(1 << 1);
    pub const EVENT: AccessModeSet = AccessModeSet(1 << 2);
    pub const EXCLUSIVE: AccessModeSet = AccessModeSet(1 << 3);

    /// Native bit positions follow the SDK's `EDeviceAccessMode` values.
    const TABLE: [(AccessModeSet, u64); 4] = [
        (AccessModeSet::CONTROL, 1 << 1),
        (AccessModeSet::STREAM, 1 << 3),
        (AccessModeSet::EVENT, 1 << 4),
        (AccessModeSet::EXCLUSIVE, 1 << 5),
    ];

    pub const KNOWN: AccessModeSet = AccessModeSet(0b1111);

    pub const fn union(self, other: AccessModeSet) -> AccessModeSet {
        AccessModeSet(self.0 | other.0)
    }

    pub const fn contains(self, other: AccessModeSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn to_native(self) -> Result<NativeAccessModeSet, Fault> {
        let unknown = self.0 & !Self::KNOWN.0;
        if unknown != 0 {
            return Err(Fault::EnumNotMatched(i64::from(unknown)));
        }
        let bits = Self::TABLE
            .iter()
            .filter(|(mode, _)| self.contains(*mode))
            .fold(0, |acc, (_, bit)| acc | bit);
        Ok(NativeAccessModeSet(bits))
    }

    pub fn from_native(native: NativeAccessModeSet) -> Result<AccessModeSet, Fault> {
        let mut modes = AccessModeSet::NONE;
        let mut rest = native.0;
        for (mode, bit) in Self::TABLE {
            if native.0 & bit != 0 {
                modes = modes.union(mode);
                rest &= !bit;
            }
        }
        if rest != 0 {
            return Err(Fault::EnumNotMatched(rest as i64));
        }
        Ok(modes)
    }
}

/// Control plus streaming, the usual mode for acquisition.
impl Default for AccessModeSet {
    fn default() -> Self {
        AccessModeSet::CONTROL.union(AccessModeSet::STREAM)
    }
}
