//! Calibration through the `vb_calib_*` surface, with `nalgebra` types.

use log::{debug, warn};
use nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use vision_boundary_calib::capi::*;
use vision_boundary_calib::{CalibFlags, Point2f, PoseMethod};
use vision_boundary_core::BoundaryEnum;

use crate::error::{check, Error, Result};

/// Mean reprojection error, intrinsics and per-view extrinsics.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    pub mean_reprojection_error: f64,
    pub camera_matrix: Matrix3<f64>,
    /// `k1, k2, p1, p2, k3`.
    pub distortion_coeffs: [f64; 5],
    pub rotation_matrices: Vec<Matrix3<f64>>,
    pub translation_vectors: Vec<Vector3<f64>>,
}

/// A point seen in the image and known in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrespondingPoint {
    pub object_point: Point3<f64>,
    pub image_point: Point2<f64>,
}

impl CorrespondingPoint {
    pub fn new(object_point: Point3<f64>, image_point: Point2<f64>) -> Self {
        Self {
            object_point,
            image_point,
        }
    }
}

/// Rodrigues rotation and translation of an object in the camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrinsics {
    pub rvec: Vector3<f64>,
    pub tvec: Vector3<f64>,
}

impl Extrinsics {
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::new(self.rvec)
    }
}

fn row_major(m: &Matrix3<f64>) -> [f64; 9] {
    let mut out = [0.0; 9];
    for (i, v) in m.transpose().iter().enumerate() {
        out[i] = *v;
    }
    out
}

fn flatten(points: &[CorrespondingPoint]) -> (Vec<f64>, Vec<f64>) {
    let mut object = Vec::with_capacity(points.len() * 3);
    let mut image = Vec::with_capacity(points.len() * 2);
    for p in points {
        object.extend_from_slice(&[p.object_point.x, p.object_point.y, p.object_point.z]);
        image.extend_from_slice(&[p.image_point.x, p.image_point.y]);
    }
    (object, image)
}

/// Initialized calibration SDK. Terminates the SDK when dropped.
pub struct CalibrationRuntime {
    _private: (),
}

impl CalibrationRuntime {
    pub fn new() -> Result<Self> {
        check(vb_calib_initialize())?;
        debug!("calibration SDK initialized");
        Ok(Self { _private: () })
    }

    pub fn calibrator(&self) -> Result<Calibrator> {
        Ok(Calibrator {
            raw: check(vb_calib_context_new())?,
        })
    }
}

impl Drop for CalibrationRuntime {
    fn drop(&mut self) {
        if let Err(err) = check(vb_calib_terminate()) {
            warn!("calibration SDK terminate failed: {err}");
        }
    }
}

struct CornerList {
    raw: *mut Point2fVec,
}

impl CornerList {
    fn new() -> Result<Self> {
        Ok(Self {
            raw: check(vb_calib_point2f_vec_new())?,
        })
    }

    fn to_vec(&self) -> Result<Vec<Point2<f32>>> {
        let slice = check(unsafe { vb_calib_point2f_vec_slice(self.raw) })?;
        // Safety: the list is alive and not written while the view is read.
        let points: &[Point2f] = unsafe { slice.as_slice() };
        Ok(points.iter().map(|p| Point2::new(p.x, p.y)).collect())
    }
}

impl Drop for CornerList {
    fn drop(&mut self) {
        let _ = unsafe { vb_calib_point2f_vec_delete(self.raw) };
    }
}

/// A calibration context.
pub struct Calibrator {
    raw: *mut CalibContext,
}

unsafe impl Send for Calibrator {}

impl Calibrator {
    /// Estimate intrinsics from several views of a known target.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip(self, views), fields(views = views.len()))
    )]
    pub fn calibrate_camera(
        &self,
        views: &[Vec<CorrespondingPoint>],
        width: u32,
        height: u32,
        flags: CalibFlags,
    ) -> Result<CalibrationResult> {
        let point_counts = views
            .iter()
            .map(|v| u32::try_from(v.len()).map_err(|_| Error::InvalidResult))
            .collect::<Result<Vec<u32>>>()?;
        let all: Vec<CorrespondingPoint> = views.iter().flatten().copied().collect();
        let (object, image) = flatten(&all);

        let mut camera_matrix = [0.0; 9];
        let mut distortion_coeffs = [0.0; 5];
        let mut rotations = vec![[0.0; 9]; views.len()];
        let mut translations = vec![[0.0; 3]; views.len()];

        let mean_reprojection_error = check(unsafe {
            vb_calib_calibrate_camera(
                self.raw,
                views.len(),
                point_counts.as_ptr(),
                object.as_ptr(),
                image.as_ptr(),
                width,
                height,
                flags,
                camera_matrix.as_mut_ptr(),
                distortion_coeffs.as_mut_ptr(),
                rotations.as_mut_ptr().cast::<f64>(),
                translations.as_mut_ptr().cast::<f64>(),
            )
        })?;
        debug!("calibrated {} views, error {mean_reprojection_error:.4}", views.len());

        Ok(CalibrationResult {
            mean_reprojection_error,
            camera_matrix: Matrix3::from_row_slice(&camera_matrix),
            distortion_coeffs,
            rotation_matrices: rotations.iter().map(|r| Matrix3::from_row_slice(r)).collect(),
            translation_vectors: translations.iter().map(|t| Vector3::from(*t)).collect(),
        })
    }

    /// Find the inner corners of a `columns x rows` chessboard in a packed
    /// RGB frame. `None` when the pattern is not found.
    pub fn find_chessboard_corners_rgb(
        &self,
        rgb: &[u8],
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    ) -> Result<Option<Vec<Point2<f32>>>> {
        match rgb_len(width, height) {
            Some(len) if rgb.len() >= len => {}
            _ => return Err(Error::InvalidResult),
        }
        let corners = CornerList::new()?;
        let found = check(unsafe {
            vb_calib_find_chessboard_corners(
                self.raw,
                rgb.as_ptr(),
                width,
                height,
                columns,
                rows,
                corners.raw,
            )
        })?;
        if !found {
            return Ok(None);
        }
        Ok(Some(corners.to_vec()?))
    }

    #[cfg(feature = "image")]
    pub fn find_chessboard_corners(
        &self,
        image: &image::RgbImage,
        columns: u32,
        rows: u32,
    ) -> Result<Option<Vec<Point2<f32>>>> {
        self.find_chessboard_corners_rgb(image.as_raw(), image.width(), image.height(), columns, rows)
    }

    /// Estimate the pose of an object. `None` when no pose was found.
    pub fn solve_pnp(
        &self,
        points: &[CorrespondingPoint],
        camera_matrix: &Matrix3<f64>,
        distortion_coeffs: &[f64; 5],
        method: PoseMethod,
    ) -> Result<Option<Extrinsics>> {
        let (object, image) = flatten(points);
        let camera_matrix = row_major(camera_matrix);
        let mut rvec = [0.0; 3];
        let mut tvec = [0.0; 3];
        let found = check(unsafe {
            vb_calib_solve_pnp(
                self.raw,
                points.len(),
                object.as_ptr(),
                image.as_ptr(),
                camera_matrix.as_ptr(),
                distortion_coeffs.as_ptr(),
                method.code(),
                rvec.as_mut_ptr(),
                tvec.as_mut_ptr(),
            )
        })?;
        Ok(found.then(|| Extrinsics {
            rvec: Vector3::from(rvec),
            tvec: Vector3::from(tvec),
        }))
    }
}

impl Drop for Calibrator {
    fn drop(&mut self) {
        let _ = unsafe { vb_calib_context_delete(self.raw) };
    }
}
