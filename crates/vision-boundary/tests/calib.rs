use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use approx::assert_relative_eq;
use nalgebra::{Matrix3, Point2, Point3};
use vision_boundary::calib::{CalibrationRuntime, CorrespondingPoint};
use vision_boundary::calib_sdk::fake::{FakeCalibrationSdk, Injection};
use vision_boundary::calib_sdk::{
    install_backend, NativeCalibFlags, NativePoseMethod, Point2f, Pose, PoseMethod,
    CALIBRATION_SDK,
};
use vision_boundary::config::{CalibrationConfig, FixedTerm, PoseSolver};
use vision_boundary::core::SdkError;
use vision_boundary::Error;

static GLOBAL_SDK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    GLOBAL_SDK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn grid_view(offset: f64) -> Vec<CorrespondingPoint> {
    [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
        .into_iter()
        .map(|[x, y]| {
            CorrespondingPoint::new(
                Point3::new(x, y, 0.0),
                Point2::new(100.0 + 50.0 * x + offset, 80.0 + 50.0 * y),
            )
        })
        .collect()
}

const CAMERA: [f64; 9] = [800.0, 0.0, 320.0, 0.0, 810.0, 240.0, 0.0, 0.0, 1.0];

#[test]
fn calibration_returns_nalgebra_types() {
    let _guard = serial();
    let sdk = Arc::new(
        FakeCalibrationSdk::new()
            .with_reprojection_error(0.25)
            .with_camera_matrix(CAMERA)
            .with_distortion([0.1, -0.05, 0.0, 0.0, 0.01]),
    );
    install_backend(sdk.clone());

    {
        let runtime = CalibrationRuntime::new().unwrap();
        let calibrator = runtime.calibrator().unwrap();

        let config = CalibrationConfig {
            fixed_terms: vec![FixedTerm::K3, FixedTerm::K5],
            ..CalibrationConfig::default()
        };
        let views = vec![grid_view(0.0), grid_view(1.0)];
        let result = calibrator
            .calibrate_camera(&views, 640, 480, config.flags())
            .unwrap();

        assert_relative_eq!(result.mean_reprojection_error, 0.25);
        assert_relative_eq!(result.camera_matrix, Matrix3::from_row_slice(&CAMERA));
        assert_eq!(result.camera_matrix[(0, 2)], 320.0);
        assert_eq!(result.distortion_coeffs[1], -0.05);
        assert_eq!(result.rotation_matrices, vec![Matrix3::identity(); 2]);
        assert_relative_eq!(result.translation_vectors[1].z, 2.0);
        assert_eq!(sdk.last_flags(), Some(NativeCalibFlags(128 | 4096)));

        let short = vec![grid_view(0.0)[..3].to_vec()];
        assert!(matches!(
            calibrator.calibrate_camera(&short, 640, 480, config.flags()),
            Err(Error::KnownException(_))
        ));
    }
    assert_eq!(sdk.init_count(), 1);
    assert_eq!(sdk.terminate_count(), 1);
    CALIBRATION_SDK.uninstall();
}

#[test]
fn chessboard_corners_depend_on_the_pattern() {
    let _guard = serial();
    let corners: Vec<Point2f> = (0..6)
        .map(|i| Point2f::new(10.0 * i as f32, 5.0))
        .collect();
    let sdk = Arc::new(FakeCalibrationSdk::new().with_corners(corners));
    install_backend(sdk.clone());

    let runtime = CalibrationRuntime::new().unwrap();
    let calibrator = runtime.calibrator().unwrap();
    let frame = image::RgbImage::new(8, 6);

    let found = calibrator.find_chessboard_corners(&frame, 3, 2).unwrap().unwrap();
    assert_eq!(found.len(), 6);
    assert_eq!(found[5], Point2::new(50.0, 5.0));
    assert_eq!(calibrator.find_chessboard_corners(&frame, 4, 4).unwrap(), None);

    assert_eq!(
        calibrator.find_chessboard_corners_rgb(&[0; 10], 8, 6, 3, 2),
        Err(Error::InvalidResult)
    );
    assert_eq!(
        calibrator.find_chessboard_corners_rgb(&[0; 12], u32::MAX, u32::MAX, 3, 2),
        Err(Error::InvalidResult)
    );

    sdk.inject(Injection::Panic);
    assert_eq!(
        calibrator.find_chessboard_corners(&frame, 3, 2),
        Err(Error::UnknownException)
    );
    sdk.inject(Injection::None);

    drop((calibrator, runtime));
    CALIBRATION_SDK.uninstall();
}

#[test]
fn pose_estimation_maps_the_solver() {
    let _guard = serial();
    let sdk = Arc::new(FakeCalibrationSdk::new().with_pose(Pose {
        rvec: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        tvec: [0.1, 0.2, 1.5],
    }));
    install_backend(sdk.clone());

    let runtime = CalibrationRuntime::new().unwrap();
    let calibrator = runtime.calibrator().unwrap();
    let camera = Matrix3::from_row_slice(&CAMERA);
    let points = grid_view(0.0);

    let pose = calibrator
        .solve_pnp(&points, &camera, &[0.0; 5], PoseSolver::default().into())
        .unwrap()
        .unwrap();
    assert_eq!(sdk.last_method(), Some(NativePoseMethod(6)));
    assert_relative_eq!(pose.tvec.z, 1.5);
    let turned = pose.rotation() * nalgebra::Vector3::x();
    assert_relative_eq!(turned, nalgebra::Vector3::y(), epsilon = 1e-12);

    calibrator
        .solve_pnp(&points, &camera, &[0.0; 5], PoseMethod::Epnp)
        .unwrap();
    assert_eq!(sdk.last_method(), Some(NativePoseMethod(1)));

    sdk.inject(Injection::Error(SdkError::known("solver diverged")));
    assert!(matches!(
        calibrator.solve_pnp(&points, &camera, &[0.0; 5], PoseMethod::Ippe),
        Err(Error::KnownException(_))
    ));
    sdk.inject(Injection::None);

    drop((calibrator, runtime));
    CALIBRATION_SDK.uninstall();
}

#[test]
fn pose_is_none_when_not_found() {
    let _guard = serial();
    install_backend(Arc::new(FakeCalibrationSdk::new()));

    let runtime = CalibrationRuntime::new().unwrap();
    let calibrator = runtime.calibrator().unwrap();
    let pose = calibrator
        .solve_pnp(
            &grid_view(0.0),
            &Matrix3::from_row_slice(&CAMERA),
            &[0.0; 5],
            PoseMethod::Ippe,
        )
        .unwrap();
    assert_eq!(pose, None);

    drop((calibrator, runtime));
    CALIBRATION_SDK.uninstall();
}
