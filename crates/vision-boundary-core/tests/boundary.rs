//! A toy SDK put behind the boundary from outside the crate, the way the
//! calibration and camera crates use it.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::Arc;

use vision_boundary_core::callback::{self, ItemCallback};
use vision_boundary_core::{
    boundary_enum, handle, native_code, translate, translate_described, translate_unit,
    BoundaryEnum, BorrowedSlice, Done, Fault, SdkError, SdkLifecycle, SdkResult, StatusCode,
    TaggedResult,
};

native_code! {
    pub struct NativeShutter(i32);
}

boundary_enum! {
    pub enum Shutter: i8 => NativeShutter {
        Unknown = -1 => NativeShutter(-1),
        Global = 0 => NativeShutter(7),
        Rolling = 1 => NativeShutter(9),
    }
    sentinel = Unknown;
}

struct Sensor {
    shutter: i32,
    samples: Vec<u16>,
}

struct Toy;

static TOY: SdkLifecycle<Toy> = SdkLifecycle::new();

fn sensor_new() -> TaggedResult<*mut Sensor> {
    translate(|| {
        TOY.backend()?;
        Ok(handle::into_handle(Sensor {
            shutter: 7,
            samples: vec![3, 1, 4, 1, 5],
        }))
    })
}

unsafe fn sensor_shutter(sensor: *const Sensor) -> TaggedResult<Shutter> {
    translate(|| Shutter::from_native(NativeShutter(handle::borrow(sensor)?.shutter)))
}

unsafe fn sensor_set_shutter(sensor: *mut Sensor, code: i32) -> TaggedResult<Done> {
    translate_unit(|| {
        let shutter = Shutter::from_code(code).ok_or(Fault::EnumNotMatched(i64::from(code)))?;
        handle::borrow_mut(sensor)?.shutter = shutter.to_native()?.0;
        Ok(())
    })
}

unsafe fn sensor_samples(sensor: *const Sensor) -> TaggedResult<BorrowedSlice<u16>> {
    translate(|| Ok(BorrowedSlice::from_slice(&handle::borrow(sensor)?.samples)))
}

unsafe fn sensor_each_sample(
    sensor: *const Sensor,
    cb: Option<ItemCallback<u16>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let sensor = handle::borrow(sensor)?;
        let cb = callback::require(cb)?;
        callback::for_each_until_failure(sensor.samples.iter().copied(), |s| Ok(cb(user_data, s)))
    })
}

unsafe fn sensor_calibrate(sensor: *const Sensor, error: *mut c_char, capacity: usize) -> TaggedResult<f64> {
    translate_described(error, capacity, || {
        let sensor = handle::borrow(sensor)?;
        let fail: SdkResult<f64> = Err(SdkError::known(format!(
            "cv::Exception: need 6 samples, got {}",
            sensor.samples.len()
        )));
        Ok(fail?)
    })
}

unsafe fn sensor_delete(sensor: *mut Sensor) -> TaggedResult<Done> {
    translate_unit(|| handle::release(sensor))
}

unsafe extern "C" fn stop_at_four(user_data: *mut c_void, sample: u16) -> u8 {
    let seen = &mut *(user_data as *mut Vec<u16>);
    seen.push(sample);
    u8::from(sample == 4)
}

#[test]
fn toy_sdk_round_trip() {
    let early = sensor_new();
    assert_eq!(early.status, StatusCode::KnownException);
    assert!(early.payload.is_null());

    TOY.install(Arc::new(Toy));
    TOY.initialize(|_| Ok(())).unwrap();
    let sensor = sensor_new().payload;

    unsafe {
        assert_eq!(sensor_shutter(sensor).payload, Shutter::Global);
        assert!(sensor_set_shutter(sensor, 1).is_ok());
        assert_eq!(sensor_shutter(sensor).payload, Shutter::Rolling);
        let bad = sensor_set_shutter(sensor, 5);
        assert_eq!(bad.status, StatusCode::EnumNotMatched);
        assert_eq!((bad.is_known_exception, bad.is_unknown_exception), (0, 0));

        (*sensor).shutter = 8;
        let unmapped = sensor_shutter(sensor);
        assert_eq!(unmapped.status, StatusCode::EnumNotMatched);
        assert_eq!(unmapped.payload, Shutter::Unknown);

        assert_eq!(sensor_samples(sensor).payload.as_slice(), &[3, 1, 4, 1, 5]);

        let mut seen: Vec<u16> = Vec::new();
        let r = sensor_each_sample(sensor, Some(stop_at_four), &mut seen as *mut Vec<u16> as *mut c_void);
        assert_eq!(r.status, StatusCode::CallbackFailed);
        assert_eq!(seen, vec![3, 1, 4]);
        let missing = sensor_each_sample(sensor, None, ptr::null_mut());
        assert_eq!(missing.status, StatusCode::NullArgument);

        let mut error = [0 as c_char; 64];
        let r = sensor_calibrate(sensor, error.as_mut_ptr(), error.len());
        assert_eq!((r.is_known_exception, r.is_unknown_exception), (1, 0));
        assert_eq!(r.payload, 0.0);
        assert_eq!(
            CStr::from_ptr(error.as_ptr()).to_str().unwrap(),
            "cv::Exception: need 6 samples, got 5"
        );

        assert!(sensor_delete(sensor).is_ok());
        assert_eq!(sensor_delete(ptr::null_mut()).status, StatusCode::NullArgument);
    }
    TOY.terminate(|_| Ok(())).unwrap();
}
