//! In-process calibration backend with scripted results.
//!
//! Used by the tests and the CLI in place of a real calibration SDK. It
//! performs no estimation: it validates input shapes the way the real SDK
//! does and writes back whatever was scripted.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use vision_boundary_core::{SdkError, SdkResult};

use crate::capi::rgb_len;
use crate::sdk::{
    CalibrationInput, CalibrationOutput, CalibrationSdk, NativeCalibFlags, NativePoseMethod,
    PatternSize, PnpInput, Point2f, Pose, RgbFrame,
};

/// How the next calls fail, if at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Injection {
    #[default]
    None,
    /// Return this error from every call.
    Error(SdkError),
    /// Panic inside every call.
    Panic,
}

#[derive(Debug)]
struct Script {
    reprojection_error: f64,
    camera_matrix: [f64; 9],
    distortion_coeffs: [f64; 5],
    corners: Option<Vec<Point2f>>,
    pose: Option<Pose>,
    injection: Injection,
    last_flags: Option<NativeCalibFlags>,
    last_method: Option<NativePoseMethod>,
    initialized: usize,
    terminated: usize,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            reprojection_error: 0.25,
            camera_matrix: [800.0, 0.0, 320.0, 0.0, 800.0, 240.0, 0.0, 0.0, 1.0],
            distortion_coeffs: [0.0; 5],
            corners: None,
            pose: None,
            injection: Injection::None,
            last_flags: None,
            last_method: None,
            initialized: 0,
            terminated: 0,
        }
    }
}

/// Scripted [`CalibrationSdk`].
#[derive(Debug, Default)]
pub struct FakeCalibrationSdk {
    script: Mutex<Script>,
}

impl FakeCalibrationSdk {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_reprojection_error(self, error: f64) -> Self {
        self.script().reprojection_error = error;
        self
    }

    pub fn with_camera_matrix(self, camera_matrix: [f64; 9]) -> Self {
        self.script().camera_matrix = camera_matrix;
        self
    }

    pub fn with_distortion(self, distortion_coeffs: [f64; 5]) -> Self {
        self.script().distortion_coeffs = distortion_coeffs;
        self
    }

    /// Corners reported when the requested pattern has the same count.
    pub fn with_corners(self, corners: Vec<Point2f>) -> Self {
        self.script().corners = Some(corners);
        self
    }

    pub fn with_pose(self, pose: Pose) -> Self {
        self.script().pose = Some(pose);
        self
    }

    pub fn inject(&self, injection: Injection) {
        self.script().injection = injection;
    }

    pub fn last_flags(&self) -> Option<NativeCalibFlags> {
        self.script().last_flags
    }

    pub fn last_method(&self) -> Option<NativePoseMethod> {
        self.script().last_method
    }

    pub fn init_count(&self) -> usize {
        self.script().initialized
    }

    pub fn terminate_count(&self) -> usize {
        self.script().terminated
    }

    fn injected(&self) -> SdkResult<()> {
        let injection = self.script().injection.clone();
        match injection {
            Injection::None => Ok(()),
            Injection::Error(err) => Err(err),
            Injection::Panic => panic!("fake calibration backend panicked"),
        }
    }
}

impl CalibrationSdk for FakeCalibrationSdk {
    fn initialize(&self) -> SdkResult<()> {
        self.injected()?;
        self.script().initialized += 1;
        Ok(())
    }

    fn terminate(&self) -> SdkResult<()> {
        self.script().terminated += 1;
        Ok(())
    }

    fn calibrate_camera(
        &self,
        input: &CalibrationInput<'_>,
        output: &mut CalibrationOutput<'_>,
    ) -> SdkResult<f64> {
        self.injected()?;
        let total: usize = input.point_counts.iter().map(|&n| n as usize).sum();
        if input.view_count() == 0 {
            return Err(SdkError::known("at least one view is required"));
        }
        if input.point_counts.iter().any(|&n| n < 4) {
            return Err(SdkError::known("each view needs at least 4 points"));
        }
        if input.object_points.len() != total || input.image_points.len() != total {
            return Err(SdkError::known("point arrays do not match point counts"));
        }
        if input.image_size.width == 0 || input.image_size.height == 0 {
            return Err(SdkError::known("image size must be positive"));
        }

        let mut script = self.script();
        script.last_flags = Some(input.flags);
        debug!(
            "fake calibration over {} views, {} points",
            input.view_count(),
            total
        );

        *output.camera_matrix = script.camera_matrix;
        *output.distortion_coeffs = script.distortion_coeffs;
        for (i, (rotation, translation)) in output
            .rotation_matrices
            .iter_mut()
            .zip(output.translation_vectors.iter_mut())
            .enumerate()
        {
            *rotation = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
            *translation = [0.0, 0.0, 1.0 + i as f64];
        }
        Ok(script.reprojection_error)
    }

    fn find_chessboard_corners(
        &self,
        frame: RgbFrame<'_>,
        pattern: PatternSize,
        corners: &mut Vec<Point2f>,
    ) -> SdkResult<bool> {
        self.injected()?;
        let expected = rgb_len(frame.size.width, frame.size.height);
        if expected != Some(frame.data.len()) || frame.data.is_empty() {
            return Err(SdkError::known("frame buffer does not match its size"));
        }
        if pattern.columns < 2 || pattern.rows < 2 {
            return Err(SdkError::known("pattern must be at least 2x2"));
        }

        let script = self.script();
        match &script.corners {
            Some(found) if found.len() == pattern.corner_count() => {
                corners.extend_from_slice(found);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn solve_pnp(
        &self,
        input: &PnpInput<'_>,
        method: NativePoseMethod,
        pose: &mut Pose,
    ) -> SdkResult<bool> {
        self.injected()?;
        if input.object_points.len() != input.image_points.len() {
            return Err(SdkError::known("point arrays differ in length"));
        }
        if input.object_points.len() < 4 {
            return Err(SdkError::known("at least 4 correspondences are required"));
        }

        let mut script = self.script();
        script.last_method = Some(method);
        match script.pose {
            Some(found) => {
                *pose = found;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
