//! Flat C boundary over a camera calibration SDK.
//!
//! The SDK is reached through the [`CalibrationSdk`] trait. A host installs
//! a backend with [`install_backend`], then the foreign caller drives it
//! through the `vb_calib_*` functions in [`capi`]:
//!
//! 1. `vb_calib_initialize`, then `vb_calib_context_new`,
//! 2. `vb_calib_calibrate_camera`, `vb_calib_find_chessboard_corners`,
//!    `vb_calib_solve_pnp` against the context,
//! 3. `vb_calib_context_delete`, then `vb_calib_terminate`.
//!
//! Corner detection writes into a `Point2fVec` handle whose contents are
//! exposed as a borrowed slice.
//!
//! [`fake::FakeCalibrationSdk`] is a scripted backend for tests and demos.

pub mod capi;
pub mod fake;
mod flags;
mod sdk;

pub use capi::{install_backend, CalibContext, Point2fVec, CALIBRATION_SDK};
pub use flags::{CalibFlags, PoseMethod};
pub use sdk::{
    CalibrationInput, CalibrationOutput, CalibrationSdk, ImageSize, NativeCalibFlags,
    NativePoseMethod, PatternSize, PnpInput, Point2f, Pose, RgbFrame,
};
