//! The camera SDK seam.
//!
//! These traits mirror the object model of a GenICam transport-layer SDK:
//! a factory enumerates devices and opens them, devices expose a parameter
//! node map and stream grabbers, grabbers deliver grab results into
//! registered buffers. Parameter nodes are shared (`Arc`) because the node
//! map owns them; every other object is owned by whoever holds it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use vision_boundary_core::{SdkResult, Sentinel, WaitOutcome};

use crate::types::{
    NativeAccessModeSet, NativeGrabStatus, NativeInterfaceType, NativePayloadType,
    NativePixelType, NativeVisibility,
};

/// Entry point of a camera SDK.
pub trait CameraSdk: Send + Sync {
    fn initialize(&self) -> SdkResult<()>;

    fn terminate(&self) -> SdkResult<()>;

    fn version_string(&self) -> SdkResult<String>;

    fn transport_layer_factory(&self) -> SdkResult<Arc<dyn TransportLayerFactory>>;
}

pub trait TransportLayerFactory: Send + Sync {
    /// Snapshot of the devices currently visible. Each entry is an
    /// independent copy.
    fn enumerate_devices(&self) -> SdkResult<Vec<Box<dyn DeviceInfo>>>;

    fn create_device(&self, info: &dyn DeviceInfo) -> SdkResult<Box<dyn Device>>;

    /// The first device found; a known exception when there is none.
    fn create_first_device(&self) -> SdkResult<Box<dyn Device>>;

    fn create_gige_transport_layer(&self) -> SdkResult<Box<dyn TransportLayer>>;
}

pub trait TransportLayer: Send {
    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>>;
}

/// Identifying properties of one device (serial number, model, ...).
pub trait DeviceInfo: Send {
    fn property_names(&self) -> SdkResult<Vec<String>>;

    /// `Ok(None)` when the device has no property of that name.
    fn property_value(&self, name: &str) -> SdkResult<Option<String>>;

    fn clone_info(&self) -> Box<dyn DeviceInfo>;
}

pub trait Device: Send {
    fn open(&mut self, modes: NativeAccessModeSet) -> SdkResult<()>;

    fn close(&mut self) -> SdkResult<()>;

    fn num_stream_grabber_channels(&self) -> SdkResult<u64>;

    fn stream_grabber(&mut self, index: u64) -> SdkResult<Box<dyn StreamGrabber>>;

    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>>;
}

pub trait NodeMap: Send + Sync {
    fn nodes(&self) -> SdkResult<Vec<Arc<dyn Node>>>;

    /// `Ok(None)` when no node has that name.
    fn node(&self, name: &str) -> SdkResult<Option<Arc<dyn Node>>>;
}

/// A generic parameter node. The `as_*` methods are the SDK's interface
/// casts: `None` means the node does not implement that interface.
pub trait Node: Send + Sync {
    fn name(&self, fully_qualified: bool) -> SdkResult<String>;

    fn visibility(&self) -> SdkResult<NativeVisibility>;

    fn principal_interface_type(&self) -> SdkResult<NativeInterfaceType>;

    fn as_integer(self: Arc<Self>) -> Option<Arc<dyn IntegerNode>> {
        None
    }

    fn as_boolean(self: Arc<Self>) -> Option<Arc<dyn BooleanNode>> {
        None
    }

    fn as_float(self: Arc<Self>) -> Option<Arc<dyn FloatNode>> {
        None
    }

    fn as_string(self: Arc<Self>) -> Option<Arc<dyn StringNode>> {
        None
    }

    fn as_enumeration(self: Arc<Self>) -> Option<Arc<dyn EnumerationNode>> {
        None
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandNode>> {
        None
    }
}

pub trait IntegerNode: Send + Sync {
    fn value(&self) -> SdkResult<i64>;
    fn set_value(&self, value: i64) -> SdkResult<()>;
    fn min(&self) -> SdkResult<i64>;
    fn max(&self) -> SdkResult<i64>;
    fn unit(&self) -> SdkResult<String>;
}

pub trait BooleanNode: Send + Sync {
    fn value(&self) -> SdkResult<bool>;
    fn set_value(&self, value: bool) -> SdkResult<()>;
}

pub trait FloatNode: Send + Sync {
    fn value(&self) -> SdkResult<f64>;
    fn set_value(&self, value: f64) -> SdkResult<()>;
    fn min(&self) -> SdkResult<f64>;
    fn max(&self) -> SdkResult<f64>;
    fn unit(&self) -> SdkResult<String>;
}

pub trait StringNode: Send + Sync {
    fn value(&self) -> SdkResult<String>;
    fn set_value(&self, value: &str) -> SdkResult<()>;
}

pub trait EnumerationNode: Send + Sync {
    /// Symbolic name of the current entry.
    fn value(&self) -> SdkResult<String>;
    fn set_value(&self, symbol: &str) -> SdkResult<()>;
    fn entries(&self) -> SdkResult<Vec<Arc<dyn Node>>>;
    /// Symbols of the entries that can be set right now.
    fn settable_values(&self) -> SdkResult<Vec<String>>;
}

pub trait CommandNode: Send + Sync {
    fn execute(&self) -> SdkResult<()>;
}

/// Token the SDK hands out for a registered buffer.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamBufferId(pub u64);

/// Ids handed out by an SDK start at 1.
impl Sentinel for StreamBufferId {
    fn sentinel() -> Self {
        StreamBufferId(0)
    }
}

/// Caller memory registered with a stream grabber.
///
/// The caller keeps the memory alive and untouched while it is registered;
/// the SDK writes frames into it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RegisteredBuffer {
    ptr: *mut u8,
    len: usize,
}

// The pointer is only dereferenced by the SDK under the registration contract.
unsafe impl Send for RegisteredBuffer {}
unsafe impl Sync for RegisteredBuffer {}

impl RegisteredBuffer {
    /// # Safety
    /// `ptr` must be valid for reads and writes of `len` bytes for as long
    /// as the buffer stays registered.
    pub unsafe fn new(ptr: *mut u8, len: usize) -> Self {
        Self { ptr, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// # Safety
    /// The registration contract must still hold.
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        std::slice::from_raw_parts(self.ptr, self.len)
    }

    /// # Safety
    /// The registration contract must still hold and no other view of the
    /// memory may be live.
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [u8] {
        std::slice::from_raw_parts_mut(self.ptr, self.len)
    }
}

impl fmt::Debug for RegisteredBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

pub trait StreamGrabber: Send {
    fn open(&mut self) -> SdkResult<()>;
    fn close(&mut self) -> SdkResult<()>;
    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>>;
    fn prepare_grab(&mut self) -> SdkResult<()>;
    /// Cancel pending requests; their results become `Canceled`.
    fn cancel_grab(&mut self) -> SdkResult<()>;
    fn finish_grab(&mut self) -> SdkResult<()>;
    fn register_buffer(&mut self, buffer: RegisteredBuffer) -> SdkResult<StreamBufferId>;
    fn queue_buffer(&mut self, id: StreamBufferId) -> SdkResult<()>;
    fn wait_object(&self) -> SdkResult<Arc<dyn WaitObject>>;
    /// `Ok(None)` when no result is ready.
    fn retrieve_result(&mut self) -> SdkResult<Option<Box<dyn GrabResult>>>;
}

pub trait GrabResult: Send {
    /// Payload bytes, borrowed from the registered buffer.
    fn buffer(&self) -> SdkResult<&[u8]>;
    fn payload_type(&self) -> SdkResult<NativePayloadType>;
    fn status(&self) -> SdkResult<NativeGrabStatus>;
    fn error_code(&self) -> SdkResult<u32>;
    fn error_description(&self) -> SdkResult<String>;
    fn grab_succeeded(&self) -> SdkResult<bool>;
    fn payload_size(&self) -> SdkResult<usize>;
    /// Size of the registered buffer, at least `payload_size`.
    fn buffer_size(&self) -> SdkResult<usize>;
    fn size_x(&self) -> SdkResult<i32>;
    fn size_y(&self) -> SdkResult<i32>;
    fn offset_x(&self) -> SdkResult<u32>;
    fn offset_y(&self) -> SdkResult<u32>;
    fn padding_x(&self) -> SdkResult<u32>;
    fn padding_y(&self) -> SdkResult<u32>;
    fn time_stamp(&self) -> SdkResult<u64>;
    /// `u64::MAX` when the transport does not provide block ids.
    fn block_id(&self) -> SdkResult<u64>;
    /// The view's buffer pointer is only valid while this result lives.
    fn image(&self) -> SdkResult<Box<dyn ImageRef>>;
    fn buffer_id(&self) -> SdkResult<StreamBufferId>;
}

/// Image view of a grab result. The accessors never raise; zero sizes and
/// a null buffer are how the SDK reports an invalid image.
pub trait ImageRef: Send {
    fn is_valid(&self) -> bool;
    fn pixel_type(&self) -> NativePixelType;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn image_size(&self) -> usize;
    /// `None` when the stride cannot be computed for the pixel type.
    fn stride(&self) -> Option<usize>;
    /// Null for an invalid image.
    fn buffer(&self) -> *const u8;
}

pub trait WaitObject: Send + Sync {
    fn wait(&self, timeout: Duration) -> SdkResult<WaitOutcome>;
}
