//! Safe Rust facade over the `vision-boundary` C surfaces.
//!
//! The wrappers here own one boundary handle each and release it on drop.
//! Every call goes through the same `extern "C"` functions a foreign caller
//! uses, and every tagged result is turned back into a typed [`Error`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vision_boundary::camera::{CameraRuntime, HasNodeMap};
//! use vision_boundary_camera::fake::{FakeCameraScenario, FakeCameraSdk};
//! use vision_boundary_camera::AccessModeSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sdk = Arc::new(FakeCameraSdk::new(FakeCameraScenario::with_cameras(1)));
//! vision_boundary_camera::install_backend(sdk);
//!
//! let runtime = CameraRuntime::new()?;
//! let factory = runtime.tl_factory()?;
//! let infos = factory.enumerate_devices()?;
//! let mut device = factory.create_device(&infos[0])?;
//! device.open(AccessModeSet::CONTROL.union(AccessModeSet::STREAM))?;
//! println!("width: {}", device.integer_value("Width")?);
//!
//! let mut grabber = device.stream_grabber(0)?;
//! grabber.open()?;
//! grabber.prepare_grab()?;
//! let id = grabber.register_buffer(640 * 480)?;
//! grabber.queue_buffer(id)?;
//! let outcome = grabber.wait_object()?.wait(Duration::from_millis(100))?;
//! println!("wait: {outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`camera`]: SDK runtime, transport layer factory, devices, parameter
//!   nodes, stream grabbers and grab results.
//! - [`calib`]: camera calibration, chessboard corners and pose estimation
//!   with `nalgebra` types.
//! - [`config`]: JSON settings shared by the wrappers and the CLI.

pub mod calib;
pub mod camera;
pub mod config;
mod error;
mod text;

pub use config::{BoundaryConfig, ConfigError};
pub use error::{Error, Result};

pub use vision_boundary_calib as calib_sdk;
pub use vision_boundary_camera as camera_sdk;
pub use vision_boundary_core as core;
