//! `extern "C"` surface of the calibration boundary.
//!
//! Every function returns a [`TaggedResult`]. Pointer arguments are checked
//! for null before anything is read; a null array is accepted only when its
//! element count is zero.

use std::sync::Arc;

use vision_boundary_core::{
    handle, translate, translate_unit, BorrowedSlice, BoundaryEnum, Done, Fault, SdkLifecycle,
    TaggedResult,
};

use crate::flags::{CalibFlags, PoseMethod};
use crate::sdk::{
    CalibrationInput, CalibrationOutput, CalibrationSdk, ImageSize, PatternSize, PnpInput,
    Point2f, Pose, RgbFrame,
};

/// Process-wide calibration SDK slot.
pub static CALIBRATION_SDK: SdkLifecycle<dyn CalibrationSdk> = SdkLifecycle::new();

/// Install the backend used by [`vb_calib_initialize`] and
/// [`vb_calib_context_new`], returning the previous one.
pub fn install_backend(sdk: Arc<dyn CalibrationSdk>) -> Option<Arc<dyn CalibrationSdk>> {
    CALIBRATION_SDK.install(sdk)
}

/// A calibration backend bound to a handle.
pub struct CalibContext {
    sdk: Arc<dyn CalibrationSdk>,
}

impl CalibContext {
    pub fn new(sdk: Arc<dyn CalibrationSdk>) -> Self {
        Self { sdk }
    }

    pub fn sdk(&self) -> &dyn CalibrationSdk {
        self.sdk.as_ref()
    }
}

/// Growable list of image points filled by corner detection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Point2fVec {
    points: Vec<Point2f>,
}

impl Point2fVec {
    pub fn as_slice(&self) -> &[Point2f] {
        &self.points
    }
}

unsafe fn read_array<'a, T>(ptr: *const T, len: usize) -> Result<&'a [T], Fault> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Fault::NullArgument);
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

unsafe fn write_array<'a, T>(ptr: *mut T, len: usize) -> Result<&'a mut [T], Fault> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(Fault::NullArgument);
    }
    Ok(std::slice::from_raw_parts_mut(ptr, len))
}

unsafe fn read_fixed<'a, const N: usize>(ptr: *const f64) -> Result<&'a [f64; N], Fault> {
    ptr.cast::<[f64; N]>().as_ref().ok_or(Fault::NullArgument)
}

unsafe fn write_fixed<'a, const N: usize>(ptr: *mut f64) -> Result<&'a mut [f64; N], Fault> {
    ptr.cast::<[f64; N]>().as_mut().ok_or(Fault::NullArgument)
}

/// Initialize the installed calibration SDK. A second call is a no-op.
#[no_mangle]
pub extern "C" fn vb_calib_initialize() -> TaggedResult<Done> {
    translate_unit(|| CALIBRATION_SDK.initialize(|sdk| sdk.initialize()))
}

/// Terminate the calibration SDK. Contexts created earlier keep their
/// backend alive but should not be used afterwards.
#[no_mangle]
pub extern "C" fn vb_calib_terminate() -> TaggedResult<Done> {
    translate_unit(|| CALIBRATION_SDK.terminate(|sdk| sdk.terminate()))
}

/// Bind the initialized SDK to a new context handle.
#[no_mangle]
pub extern "C" fn vb_calib_context_new() -> TaggedResult<*mut CalibContext> {
    translate(|| {
        let sdk = CALIBRATION_SDK.backend()?;
        Ok(handle::into_handle(CalibContext::new(sdk)))
    })
}

/// # Safety
/// `context` must be null or a live handle from [`vb_calib_context_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_calib_context_delete(context: *mut CalibContext) -> TaggedResult<Done> {
    translate_unit(|| handle::release(context))
}

/// Estimate camera intrinsics from `image_count` views.
///
/// `object_points` holds `3 * total` doubles and `image_points` `2 * total`,
/// where `total` is the sum of `point_counts`. Outputs: `camera_matrix`
/// (9, row major), `distortion_coeffs` (5), `rotation_matrices`
/// (`9 * image_count`) and `translation_vectors` (`3 * image_count`).
/// The payload is the mean reprojection error.
///
/// # Safety
/// Every pointer must be null or valid for the element counts above.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn vb_calib_calibrate_camera(
    context: *const CalibContext,
    image_count: usize,
    point_counts: *const u32,
    object_points: *const f64,
    image_points: *const f64,
    image_width: u32,
    image_height: u32,
    flags: CalibFlags,
    camera_matrix: *mut f64,
    distortion_coeffs: *mut f64,
    rotation_matrices: *mut f64,
    translation_vectors: *mut f64,
) -> TaggedResult<f64> {
    translate(|| {
        let context = handle::borrow(context)?;
        let point_counts = read_array(point_counts, image_count)?;
        let total = point_counts
            .iter()
            .try_fold(0usize, |sum, &n| sum.checked_add(n as usize))
            .ok_or(Fault::InvalidResult("total point count"))?;
        let input = CalibrationInput {
            point_counts,
            object_points: read_array(object_points.cast::<[f64; 3]>(), total)?,
            image_points: read_array(image_points.cast::<[f64; 2]>(), total)?,
            image_size: ImageSize {
                width: image_width,
                height: image_height,
            },
            flags: flags.to_native()?,
        };
        let mut output = CalibrationOutput {
            camera_matrix: write_fixed::<9>(camera_matrix)?,
            distortion_coeffs: write_fixed::<5>(distortion_coeffs)?,
            rotation_matrices: write_array(rotation_matrices.cast::<[f64; 9]>(), image_count)?,
            translation_vectors: write_array(translation_vectors.cast::<[f64; 3]>(), image_count)?,
        };
        Ok(context.sdk().calibrate_camera(&input, &mut output)?)
    })
}

/// Byte length of a packed RGB frame, `None` when it does not fit `usize`.
pub fn rgb_len(width: u32, height: u32) -> Option<usize> {
    3usize
        .checked_mul(width as usize)?
        .checked_mul(height as usize)
}

/// Detect chessboard corners in a packed RGB frame.
///
/// `corners` is cleared and then filled by the SDK. A `false` payload means
/// the pattern was not found.
///
/// # Safety
/// `rgb` must be null or valid for `3 * width * height` bytes; the handles
/// must be null or live.
#[no_mangle]
pub unsafe extern "C" fn vb_calib_find_chessboard_corners(
    context: *const CalibContext,
    rgb: *const u8,
    width: u32,
    height: u32,
    pattern_columns: u32,
    pattern_rows: u32,
    corners: *mut Point2fVec,
) -> TaggedResult<bool> {
    translate(|| {
        let context = handle::borrow(context)?;
        let corners = handle::borrow_mut(corners)?;
        let len = rgb_len(width, height).ok_or(Fault::InvalidResult("frame size"))?;
        let frame = RgbFrame {
            data: read_array(rgb, len)?,
            size: ImageSize { width, height },
        };
        let pattern = PatternSize {
            columns: pattern_columns,
            rows: pattern_rows,
        };
        corners.points.clear();
        Ok(context
            .sdk()
            .find_chessboard_corners(frame, pattern, &mut corners.points)?)
    })
}

/// Estimate an object pose from `point_count` correspondences.
///
/// `method` is a [`PoseMethod`] code. `rvec` and `tvec` receive three
/// doubles each. A `false` payload means no pose was found.
///
/// # Safety
/// Every pointer must be null or valid for the element counts implied by
/// `point_count`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn vb_calib_solve_pnp(
    context: *const CalibContext,
    point_count: usize,
    object_points: *const f64,
    image_points: *const f64,
    camera_matrix: *const f64,
    distortion_coeffs: *const f64,
    method: i32,
    rvec: *mut f64,
    tvec: *mut f64,
) -> TaggedResult<bool> {
    translate(|| {
        let context = handle::borrow(context)?;
        let method = PoseMethod::from_code(method)
            .ok_or(Fault::EnumNotMatched(i64::from(method)))?
            .to_native()?;
        let input = PnpInput {
            object_points: read_array(object_points.cast::<[f64; 3]>(), point_count)?,
            image_points: read_array(image_points.cast::<[f64; 2]>(), point_count)?,
            camera_matrix: read_fixed::<9>(camera_matrix)?,
            distortion_coeffs: read_fixed::<5>(distortion_coeffs)?,
        };
        let rvec = write_fixed::<3>(rvec)?;
        let tvec = write_fixed::<3>(tvec)?;

        let mut pose = Pose::default();
        let found = context.sdk().solve_pnp(&input, method, &mut pose)?;
        if found {
            *rvec = pose.rvec;
            *tvec = pose.tvec;
        }
        Ok(found)
    })
}

#[no_mangle]
pub extern "C" fn vb_calib_point2f_vec_new() -> TaggedResult<*mut Point2fVec> {
    translate(|| Ok(handle::into_handle(Point2fVec::default())))
}

/// # Safety
/// `vec` must be null or a live handle from [`vb_calib_point2f_vec_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_calib_point2f_vec_delete(vec: *mut Point2fVec) -> TaggedResult<Done> {
    translate_unit(|| handle::release(vec))
}

/// Borrow the points. The view is invalidated by the next corner detection
/// into the same list and by deleting it.
///
/// # Safety
/// `vec` must be null or a live handle from [`vb_calib_point2f_vec_new`].
#[no_mangle]
pub unsafe extern "C" fn vb_calib_point2f_vec_slice(
    vec: *const Point2fVec,
) -> TaggedResult<BorrowedSlice<Point2f>> {
    translate(|| Ok(BorrowedSlice::from_slice(handle::borrow(vec)?.as_slice())))
}
