//! Shared library exporting the calibration and camera C surfaces.
//!
//! The `vb_calib_*`, `vb_cam_*` and `vb_string_*` functions are defined in
//! their own crates and re-exported here (as [`calib`], [`camera`] and the
//! string functions) so a single `cdylib` carries all of them. This crate
//! adds process setup on top: logging and, with the `fake-backends`
//! feature, installers for the simulated SDKs.
//!
//! `generate-ffi-header` (feature `generate-header`) writes the matching C
//! header with `cbindgen`.

use std::os::raw::c_char;

use vision_boundary_core::text::borrow_c_str;
use vision_boundary_core::{init_with_levels, translate_unit, Done, LogLevels, SdkError, TaggedResult};

pub use vision_boundary_calib::capi as calib;
pub use vision_boundary_camera::capi as camera;
pub use vision_boundary_core::text::{
    vb_string_bytes, vb_string_delete, vb_string_len, vb_string_new,
};

/// Route `log` records to stderr. `level` is a level name (`"off"`,
/// `"error"`, ... `"trace"`; unknown names mean `"info"`), optionally
/// followed by per-source overrides such as `",camera=debug,calib=off"`.
///
/// Only the first successful call takes effect. Fails with a known
/// exception when the host process installed another logger.
///
/// # Safety
/// `level` must be a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vb_log_init(level: *const c_char) -> TaggedResult<Done> {
    translate_unit(|| {
        let levels = LogLevels::parse(&borrow_c_str(level)?);
        init_with_levels(levels).map_err(|err| SdkError::known(err.to_string()))?;
        log::debug!("boundary logging with {levels:?}");
        Ok(())
    })
}

#[cfg(feature = "fake-backends")]
mod fake_backends {
    use std::os::raw::c_char;
    use std::sync::Arc;

    use vision_boundary_calib::fake::FakeCalibrationSdk;
    use vision_boundary_camera::fake::{FakeCameraScenario, FakeCameraSdk};
    use vision_boundary_core::text::borrow_c_str;
    use vision_boundary_core::{
        translate_described, translate_unit, Done, SdkError, TaggedResult, DONE,
    };

    /// Install the simulated camera SDK. `scenario_json` describes the
    /// devices; null installs a single camera. A malformed scenario is a
    /// known exception whose text is copied into `error`.
    ///
    /// Replaces any installed backend and leaves the SDK uninitialized.
    ///
    /// # Safety
    /// `scenario_json` must be null or NUL-terminated. `error` must be null
    /// or valid for writes of `capacity` bytes.
    #[no_mangle]
    pub unsafe extern "C" fn vb_fake_camera_install(
        scenario_json: *const c_char,
        error: *mut c_char,
        capacity: usize,
    ) -> TaggedResult<Done> {
        translate_described(error, capacity, || {
            let scenario = if scenario_json.is_null() {
                FakeCameraScenario::with_cameras(1)
            } else {
                FakeCameraScenario::from_json_str(&borrow_c_str(scenario_json)?)
                    .map_err(|err| SdkError::known(format!("invalid scenario: {err}")))?
            };
            log::info!("installing fake camera SDK with {} devices", scenario.devices.len());
            vision_boundary_camera::install_backend(Arc::new(FakeCameraSdk::new(scenario)));
            Ok(DONE)
        })
    }

    /// Install the simulated calibration SDK with its default results.
    #[no_mangle]
    pub extern "C" fn vb_fake_calibration_install() -> TaggedResult<Done> {
        translate_unit(|| {
            vision_boundary_calib::install_backend(Arc::new(FakeCalibrationSdk::new()));
            Ok(())
        })
    }
}

#[cfg(feature = "fake-backends")]
pub use fake_backends::{vb_fake_calibration_install, vb_fake_camera_install};
