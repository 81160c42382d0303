//! The calibration SDK seam.
//!
//! Everything here is plain Rust: slices in, slices out, errors as
//! [`SdkError`]. The C surface in [`crate::capi`] validates raw pointers and
//! builds these views before calling into a backend.

use vision_boundary_core::{native_code, SdkResult};

native_code! {
    /// Solver selector constant understood by the calibration SDK.
    pub struct NativePoseMethod(i32);
}

native_code! {
    /// Calibration flag word in the calibration SDK's own bit layout.
    pub struct NativeCalibFlags(u32);
}

/// Sub-pixel image position, laid out as two consecutive `f32`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Inner-corner count of a chessboard, columns by rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternSize {
    pub columns: u32,
    pub rows: u32,
}

impl PatternSize {
    pub fn corner_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Packed 8-bit RGB frame, row major, no padding.
#[derive(Clone, Copy, Debug)]
pub struct RgbFrame<'a> {
    pub data: &'a [u8],
    pub size: ImageSize,
}

/// Correspondences of all views fed to one calibration.
///
/// `object_points` and `image_points` hold the points of every view back to
/// back; `point_counts[i]` says how many belong to view `i`.
#[derive(Clone, Copy, Debug)]
pub struct CalibrationInput<'a> {
    pub point_counts: &'a [u32],
    pub object_points: &'a [[f64; 3]],
    pub image_points: &'a [[f64; 2]],
    pub image_size: ImageSize,
    pub flags: NativeCalibFlags,
}

impl CalibrationInput<'_> {
    pub fn view_count(&self) -> usize {
        self.point_counts.len()
    }
}

/// Caller-owned storage the SDK writes calibration results into.
#[derive(Debug)]
pub struct CalibrationOutput<'a> {
    /// Row-major 3x3 intrinsics.
    pub camera_matrix: &'a mut [f64; 9],
    /// `k1, k2, p1, p2, k3`.
    pub distortion_coeffs: &'a mut [f64; 5],
    /// One row-major 3x3 rotation per view.
    pub rotation_matrices: &'a mut [[f64; 9]],
    pub translation_vectors: &'a mut [[f64; 3]],
}

/// Input to a single-view pose estimation.
#[derive(Clone, Copy, Debug)]
pub struct PnpInput<'a> {
    pub object_points: &'a [[f64; 3]],
    pub image_points: &'a [[f64; 2]],
    pub camera_matrix: &'a [f64; 9],
    pub distortion_coeffs: &'a [f64; 5],
}

/// Estimated pose as Rodrigues rotation plus translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub rvec: [f64; 3],
    pub tvec: [f64; 3],
}

/// A calibration SDK as seen from the boundary.
pub trait CalibrationSdk: Send + Sync {
    fn initialize(&self) -> SdkResult<()> {
        Ok(())
    }

    fn terminate(&self) -> SdkResult<()> {
        Ok(())
    }

    /// Estimate intrinsics and per-view extrinsics, returning the mean
    /// reprojection error.
    fn calibrate_camera(
        &self,
        input: &CalibrationInput<'_>,
        output: &mut CalibrationOutput<'_>,
    ) -> SdkResult<f64>;

    /// Detect the inner corners of a chessboard. `Ok(false)` means the
    /// pattern was not found, which is not an error.
    fn find_chessboard_corners(
        &self,
        frame: RgbFrame<'_>,
        pattern: PatternSize,
        corners: &mut Vec<Point2f>,
    ) -> SdkResult<bool>;

    /// Estimate the pose of an object. `Ok(false)` means no pose was found.
    fn solve_pnp(
        &self,
        input: &PnpInput<'_>,
        method: NativePoseMethod,
        pose: &mut Pose,
    ) -> SdkResult<bool>;
}
