//! Flat C boundary over a GenICam camera SDK.
//!
//! The SDK object model (transport layer factory, device infos, devices,
//! parameter node maps, stream grabbers, grab results) is reached through
//! the traits in this crate's root. The `vb_cam_*` functions in [`capi`]
//! expose it as opaque handles and tagged results.
//!
//! A typical acquisition from the foreign side:
//!
//! 1. `vb_cam_initialize`, `vb_cam_tl_factory_new`,
//! 2. `vb_cam_tl_factory_enumerate_devices`, then
//!    `vb_cam_tl_factory_create_device` for the chosen info,
//! 3. `vb_cam_device_open`, `vb_cam_device_stream_grabber`, open and
//!    prepare the grabber, register and queue buffers,
//! 4. `vb_cam_wait_object_wait` then `vb_cam_stream_grabber_retrieve_result`
//!    in a loop, re-queuing each result's buffer,
//! 5. finish the grab and delete every handle, then `vb_cam_terminate`.
//!
//! Native enumeration values are translated through explicit tables in
//! [`types`]. [`fake::FakeCameraSdk`] simulates an SDK from a JSON scenario.

pub mod capi;
pub mod fake;
mod sdk;
pub mod types;

pub use capi::{install_backend, CAMERA_SDK};
pub use sdk::{
    BooleanNode, CameraSdk, CommandNode, Device, DeviceInfo, EnumerationNode, FloatNode,
    GrabResult, ImageRef, IntegerNode, Node, NodeMap, RegisteredBuffer, StreamBufferId,
    StreamGrabber, StringNode, TransportLayer, TransportLayerFactory, WaitObject,
};
pub use types::{AccessModeSet, GrabStatus, InterfaceType, PayloadType, PixelType, Visibility};
