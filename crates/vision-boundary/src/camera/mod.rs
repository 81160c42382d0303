//! Owned wrappers over the `vb_cam_*` surface.
//!
//! Every wrapper holds one boundary handle and deletes it on drop. Calls go
//! through the C ABI exactly as a foreign caller would make them, so the
//! facade exercises the same paths as C code linking the shared library.

mod node;
mod stream;

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_void};

use log::{debug, warn};
use vision_boundary_camera::capi::node::NodeMapHandle;
use vision_boundary_camera::capi::*;
use vision_boundary_camera::AccessModeSet;

use crate::config::BoundaryConfig;
use crate::error::{check, check_described, Error, Result};
use crate::text::read_text;

pub use node::{
    BooleanNode, CommandNode, EnumerationNode, FloatNode, IntegerNode, Node, NodeMap, StringNode,
};
pub use stream::{GrabResult, ImageRef, StreamGrabber, WaitObject};

pub(crate) fn c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::InteriorNul(text.to_string()))
}

/// [`c_string`] for lookup keys. No SDK name holds a NUL, so such a key is
/// simply not found.
pub(crate) fn c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| Error::NameNotFound(name.to_string()))
}

/// Collect the handles an enumerate call hands to its callback.
pub(crate) unsafe extern "C" fn push_handle<H>(user_data: *mut c_void, item: *mut H) -> u8 {
    let target = &mut *(user_data as *mut Vec<*mut H>);
    target.push(item);
    0
}

pub(crate) unsafe extern "C" fn push_name(user_data: *mut c_void, name: *const c_char) -> u8 {
    let target = &mut *(user_data as *mut Vec<String>);
    match CStr::from_ptr(name).to_str() {
        Ok(name) => {
            target.push(name.to_string());
            0
        }
        Err(_) => 1,
    }
}

/// Version of the installed camera SDK.
pub fn version_string() -> Result<String> {
    read_text(|dest, capacity| unsafe { vb_cam_version_string(dest, capacity) })
}

/// Initialized camera SDK. Terminates the SDK when dropped.
pub struct CameraRuntime {
    config: BoundaryConfig,
}

impl CameraRuntime {
    pub fn new() -> Result<Self> {
        Self::with_config(BoundaryConfig::default())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn with_config(config: BoundaryConfig) -> Result<Self> {
        check(vb_cam_initialize())?;
        debug!("camera SDK initialized");
        Ok(Self { config })
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    pub fn tl_factory(&self) -> Result<TlFactory> {
        Ok(TlFactory {
            raw: check(vb_cam_tl_factory_new())?,
            error_capacity: self.config.error_description_capacity,
        })
    }
}

impl Drop for CameraRuntime {
    fn drop(&mut self) {
        if let Err(err) = check(vb_cam_terminate()) {
            warn!("camera SDK terminate failed: {err}");
        }
    }
}

pub struct TlFactory {
    raw: *mut TlFactoryHandle,
    error_capacity: usize,
}

unsafe impl Send for TlFactory {}

impl TlFactory {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        let mut found: Vec<*mut DeviceInfoHandle> = Vec::new();
        let status = check(unsafe {
            vb_cam_tl_factory_enumerate_devices(
                self.raw,
                Some(push_handle::<DeviceInfoHandle>),
                &mut found as *mut Vec<*mut DeviceInfoHandle> as *mut c_void,
            )
        });
        let infos: Vec<DeviceInfo> = found.into_iter().map(|raw| DeviceInfo { raw }).collect();
        status?;
        debug!("enumerated {} devices", infos.len());
        Ok(infos)
    }

    /// Create a device for `info`. A known SDK exception carries its
    /// description.
    pub fn create_device(&self, info: &DeviceInfo) -> Result<Device> {
        let mut error = vec![0 as c_char; self.error_capacity.max(1)];
        let raw = check_described(
            unsafe {
                vb_cam_tl_factory_create_device(self.raw, info.raw, error.as_mut_ptr(), error.len())
            },
            &error,
        )?;
        Ok(Device { raw })
    }

    /// Create a device for the first camera found. With none attached this
    /// is a [`Error::KnownException`] saying so.
    pub fn create_first_device(&self) -> Result<Device> {
        let mut error = vec![0 as c_char; self.error_capacity.max(1)];
        let raw = check_described(
            unsafe { vb_cam_tl_factory_create_first_device(self.raw, error.as_mut_ptr(), error.len()) },
            &error,
        )?;
        Ok(Device { raw })
    }

    pub fn create_gige_transport_layer(&self) -> Result<TransportLayer> {
        Ok(TransportLayer {
            raw: check(unsafe { vb_cam_tl_factory_create_gige_transport_layer(self.raw) })?,
        })
    }
}

impl Drop for TlFactory {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_tl_factory_delete(self.raw) };
    }
}

/// Anything that exposes a parameter node map.
pub trait HasNodeMap {
    fn node_map(&self) -> Result<NodeMap>;

    /// Shortcut for reading an integer parameter.
    fn integer_value(&self, name: &str) -> Result<i64> {
        self.node_map()?.node(name)?.into_integer()?.value()
    }

    /// Shortcut for reading the symbolic value of an enumeration parameter.
    fn enumeration_value(&self, name: &str) -> Result<String> {
        self.node_map()?.node(name)?.into_enumeration()?.value()
    }

    fn set_enumeration_value(&self, name: &str, symbol: &str) -> Result<()> {
        self.node_map()?
            .node(name)?
            .into_enumeration()?
            .set_value(symbol)
    }

    fn execute_command(&self, name: &str) -> Result<()> {
        self.node_map()?.node(name)?.into_command()?.execute()
    }
}

pub struct TransportLayer {
    raw: *mut TransportLayerHandle,
}

unsafe impl Send for TransportLayer {}

impl HasNodeMap for TransportLayer {
    fn node_map(&self) -> Result<NodeMap> {
        let raw: *mut NodeMapHandle = check(unsafe { vb_cam_transport_layer_node_map(self.raw) })?;
        Ok(NodeMap::from_raw(raw))
    }
}

impl Drop for TransportLayer {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_transport_layer_delete(self.raw) };
    }
}

/// Identity and transport properties of one discovered device.
pub struct DeviceInfo {
    raw: *mut DeviceInfoHandle,
}

unsafe impl Send for DeviceInfo {}

impl DeviceInfo {
    pub fn property_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        check(unsafe {
            vb_cam_device_info_property_names(
                self.raw,
                Some(push_name),
                &mut names as *mut Vec<String> as *mut c_void,
            )
        })?;
        Ok(names)
    }

    pub fn property_value(&self, name: &str) -> Result<String> {
        let key = c_name(name)?;
        read_text(|dest, capacity| unsafe {
            vb_cam_device_info_property_value(self.raw, key.as_ptr(), dest, capacity)
        })
        .map_err(|e| e.named(name))
    }

    pub fn serial_number(&self) -> Result<String> {
        self.property_value("SerialNumber")
    }

    pub fn model_name(&self) -> Result<String> {
        self.property_value("ModelName")
    }

    /// Independent copy, kept after this info is dropped.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            raw: check(unsafe { vb_cam_device_info_copy(self.raw) })?,
        })
    }
}

impl fmt::Debug for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceInfo")
            .field("serial_number", &self.serial_number().ok())
            .field("model_name", &self.model_name().ok())
            .finish()
    }
}

impl Drop for DeviceInfo {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_device_info_delete(self.raw) };
    }
}

pub struct Device {
    raw: *mut DeviceHandle,
}

unsafe impl Send for Device {}

impl Device {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self)))]
    pub fn open(&mut self, modes: AccessModeSet) -> Result<()> {
        check(unsafe { vb_cam_device_open(self.raw, modes) })?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        check(unsafe { vb_cam_device_close(self.raw) })?;
        Ok(())
    }

    pub fn num_stream_grabber_channels(&self) -> Result<u64> {
        check(unsafe { vb_cam_device_num_stream_grabber_channels(self.raw) })
    }

    pub fn stream_grabber(&mut self, index: u64) -> Result<StreamGrabber> {
        let raw = check(unsafe { vb_cam_device_stream_grabber(self.raw, index) })?;
        Ok(StreamGrabber::from_raw(raw))
    }
}

impl HasNodeMap for Device {
    fn node_map(&self) -> Result<NodeMap> {
        Ok(NodeMap::from_raw(check(unsafe {
            vb_cam_device_node_map(self.raw)
        })?))
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_device_delete(self.raw) };
    }
}
