//! `extern "C"` surface of the camera boundary.
//!
//! Every function returns a [`TaggedResult`]. Objects cross as opaque
//! handles; each handle type has exactly one `_delete` function. Text
//! getters copy into a caller buffer of `capacity` bytes and report the
//! full text length, so a call with `capacity == 0` measures the text.
//!
//! This module holds the SDK entry points, the transport layer factory,
//! device infos, transport layers and devices. Parameter nodes live in
//! [`node`], stream grabbing in [`stream`].

pub mod node;
pub mod stream;

use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use vision_boundary_core::callback::{self, ItemCallback};
use vision_boundary_core::text::{borrow_c_str, copy_to_c_buffer};
use vision_boundary_core::{
    handle, translate, translate_described, translate_unit, Done, Fault, SdkLifecycle,
    TaggedResult,
};

use crate::sdk::{CameraSdk, Device, DeviceInfo, TransportLayer, TransportLayerFactory};
use crate::types::AccessModeSet;
use node::NodeMapHandle;
use stream::StreamGrabberHandle;

/// Process-wide camera SDK slot.
pub static CAMERA_SDK: SdkLifecycle<dyn CameraSdk> = SdkLifecycle::new();

/// Install the backend used by [`vb_cam_initialize`], returning the
/// previous one.
pub fn install_backend(sdk: Arc<dyn CameraSdk>) -> Option<Arc<dyn CameraSdk>> {
    CAMERA_SDK.install(sdk)
}

pub struct TlFactoryHandle(Arc<dyn TransportLayerFactory>);

pub struct DeviceInfoHandle(Box<dyn DeviceInfo>);

pub struct TransportLayerHandle(Box<dyn TransportLayer>);

pub struct DeviceHandle(Box<dyn Device>);

impl TlFactoryHandle {
    pub fn new(factory: Arc<dyn TransportLayerFactory>) -> Self {
        Self(factory)
    }
}

/// Copy `text` out and report its full length.
pub(crate) unsafe fn deliver_text(
    text: &str,
    dest: *mut c_char,
    capacity: usize,
) -> Result<usize, Fault> {
    copy_to_c_buffer(text, dest, capacity)?;
    Ok(text.len())
}

#[no_mangle]
pub extern "C" fn vb_cam_initialize() -> TaggedResult<Done> {
    translate_unit(|| CAMERA_SDK.initialize(|sdk| sdk.initialize()))
}

#[no_mangle]
pub extern "C" fn vb_cam_terminate() -> TaggedResult<Done> {
    translate_unit(|| CAMERA_SDK.terminate(|sdk| sdk.terminate()))
}

/// # Safety
/// `dest` must be null or valid for writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_version_string(
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let version = CAMERA_SDK.backend()?.version_string()?;
        deliver_text(&version, dest, capacity)
    })
}

#[no_mangle]
pub extern "C" fn vb_cam_tl_factory_new() -> TaggedResult<*mut TlFactoryHandle> {
    translate(|| {
        let factory = CAMERA_SDK.backend()?.transport_layer_factory()?;
        Ok(handle::into_handle(TlFactoryHandle(factory)))
    })
}

/// # Safety
/// `factory` must be null or a live factory handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_tl_factory_delete(factory: *mut TlFactoryHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(factory))
}

/// Call `callback` once per visible device. The callback owns each
/// device info handle it receives and must delete it.
///
/// The payload is the number of devices delivered.
///
/// # Safety
/// `factory` must be null or a live factory handle. `callback` is called
/// with `user_data` unchanged.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_tl_factory_enumerate_devices(
    factory: *const TlFactoryHandle,
    callback: Option<ItemCallback<*mut DeviceInfoHandle>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let factory = handle::borrow(factory)?;
        let callback = callback::require(callback)?;
        let infos = factory.0.enumerate_devices()?;
        callback::for_each_until_failure(infos, |info| {
            Ok(callback(user_data, handle::into_handle(DeviceInfoHandle(info))))
        })
    })
}

/// Create a device for `info`. On a known SDK exception its description is
/// copied into `error` (at most `capacity` bytes).
///
/// # Safety
/// Handles must be null or live; `error` must be null or valid for writes
/// of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_tl_factory_create_device(
    factory: *const TlFactoryHandle,
    info: *const DeviceInfoHandle,
    error: *mut c_char,
    capacity: usize,
) -> TaggedResult<*mut DeviceHandle> {
    translate_described(error, capacity, || {
        let factory = handle::borrow(factory)?;
        let info = handle::borrow(info)?;
        let device = factory.0.create_device(info.0.as_ref())?;
        Ok(handle::into_handle(DeviceHandle(device)))
    })
}

/// Create a device for the first camera the factory finds. With no camera
/// attached this is a known SDK exception, described into `error`.
///
/// # Safety
/// `factory` must be null or live; `error` must be null or valid for
/// writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_tl_factory_create_first_device(
    factory: *const TlFactoryHandle,
    error: *mut c_char,
    capacity: usize,
) -> TaggedResult<*mut DeviceHandle> {
    translate_described(error, capacity, || {
        let device = handle::borrow(factory)?.0.create_first_device()?;
        Ok(handle::into_handle(DeviceHandle(device)))
    })
}

/// # Safety
/// `factory` must be null or a live factory handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_tl_factory_create_gige_transport_layer(
    factory: *const TlFactoryHandle,
) -> TaggedResult<*mut TransportLayerHandle> {
    translate(|| {
        let factory = handle::borrow(factory)?;
        let tl = factory.0.create_gige_transport_layer()?;
        Ok(handle::into_handle(TransportLayerHandle(tl)))
    })
}

/// # Safety
/// `tl` must be null or a live transport layer handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_transport_layer_node_map(
    tl: *const TransportLayerHandle,
) -> TaggedResult<*mut NodeMapHandle> {
    translate(|| {
        let map = handle::borrow(tl)?.0.node_map()?;
        Ok(handle::into_handle(NodeMapHandle::new(map)))
    })
}

/// # Safety
/// `tl` must be null or a live transport layer handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_transport_layer_delete(tl: *mut TransportLayerHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(tl))
}

/// # Safety
/// `info` must be null or a live device info handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_info_delete(info: *mut DeviceInfoHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(info))
}

/// Independent copy of `info`, deleted separately.
///
/// # Safety
/// `info` must be null or a live device info handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_info_copy(
    info: *const DeviceInfoHandle,
) -> TaggedResult<*mut DeviceInfoHandle> {
    translate(|| {
        let info = handle::borrow(info)?;
        Ok(handle::into_handle(DeviceInfoHandle(info.0.clone_info())))
    })
}

/// Call `callback` once per property name. The name is borrowed for the
/// duration of the call only.
///
/// # Safety
/// `info` must be null or a live device info handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_info_property_names(
    info: *const DeviceInfoHandle,
    callback: Option<ItemCallback<*const c_char>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let info = handle::borrow(info)?;
        let callback = callback::require(callback)?;
        let names = info.0.property_names()?;
        callback::for_each_until_failure(names, |name| {
            let name = CString::new(name).map_err(|_| Fault::InvalidResult("property name"))?;
            Ok(callback(user_data, name.as_ptr()))
        })
    })
}

/// Copy the value of property `name`. A missing property is
/// `NameNotFound`.
///
/// # Safety
/// `info` must be null or live, `name` null or NUL-terminated, `dest` null
/// or valid for writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_info_property_value(
    info: *const DeviceInfoHandle,
    name: *const c_char,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let info = handle::borrow(info)?;
        let name = borrow_c_str(name)?;
        let value = info
            .0
            .property_value(&name)?
            .ok_or_else(|| Fault::NameNotFound(name.to_string()))?;
        deliver_text(&value, dest, capacity)
    })
}

/// Open the device with the given access modes.
///
/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_open(
    device: *mut DeviceHandle,
    modes: AccessModeSet,
) -> TaggedResult<Done> {
    translate_unit(|| {
        let device = handle::borrow_mut(device)?;
        device.0.open(modes.to_native()?)?;
        Ok(())
    })
}

/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_close(device: *mut DeviceHandle) -> TaggedResult<Done> {
    translate_unit(|| Ok(handle::borrow_mut(device)?.0.close()?))
}

/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_num_stream_grabber_channels(
    device: *const DeviceHandle,
) -> TaggedResult<u64> {
    translate(|| Ok(handle::borrow(device)?.0.num_stream_grabber_channels()?))
}

/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_stream_grabber(
    device: *mut DeviceHandle,
    index: u64,
) -> TaggedResult<*mut StreamGrabberHandle> {
    translate(|| {
        let grabber = handle::borrow_mut(device)?.0.stream_grabber(index)?;
        Ok(handle::into_handle(StreamGrabberHandle::new(grabber)))
    })
}

/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_node_map(
    device: *const DeviceHandle,
) -> TaggedResult<*mut NodeMapHandle> {
    translate(|| {
        let map = handle::borrow(device)?.0.node_map()?;
        Ok(handle::into_handle(NodeMapHandle::new(map)))
    })
}

/// # Safety
/// `device` must be null or a live device handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_device_delete(device: *mut DeviceHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(device))
}
