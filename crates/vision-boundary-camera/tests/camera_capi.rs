use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use vision_boundary_camera::capi::node::*;
use vision_boundary_camera::capi::stream::*;
use vision_boundary_camera::capi::*;
use vision_boundary_camera::fake::{
    FakeCameraScenario, FakeCameraSdk, FakeDeviceSpec, FakeFrame, FakeNodeSpec, Injection,
};
use vision_boundary_camera::{
    AccessModeSet, CameraSdk, GrabStatus, InterfaceType, PayloadType, PixelType, CAMERA_SDK,
};
use vision_boundary_core::text::{
    live_string_handles, vb_string_bytes, vb_string_delete, vb_string_new,
};
use vision_boundary_core::{handle, SdkError, StatusCode, WaitOutcome};

static GLOBAL_SDK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    GLOBAL_SDK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn factory(sdk: &FakeCameraSdk) -> *mut TlFactoryHandle {
    handle::into_handle(TlFactoryHandle::new(sdk.transport_layer_factory().unwrap()))
}

fn text(buf: &[c_char]) -> String {
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

struct Calls {
    infos: Vec<*mut DeviceInfoHandle>,
    fail_at: usize,
}

unsafe extern "C" fn record(user_data: *mut c_void, info: *mut DeviceInfoHandle) -> u8 {
    let calls = &mut *(user_data as *mut Calls);
    calls.infos.push(info);
    u8::from(calls.infos.len() == calls.fail_at)
}

fn enumerate(f: *mut TlFactoryHandle, fail_at: usize) -> (StatusCode, usize, Vec<*mut DeviceInfoHandle>) {
    let mut calls = Calls {
        infos: Vec::new(),
        fail_at,
    };
    let r = unsafe {
        vb_cam_tl_factory_enumerate_devices(f, Some(record), &mut calls as *mut Calls as *mut c_void)
    };
    (r.status, r.payload, calls.infos)
}

unsafe extern "C" fn collect_node(user_data: *mut c_void, node: *mut NodeHandle) -> u8 {
    (*(user_data as *mut Vec<*mut NodeHandle>)).push(node);
    0
}

unsafe extern "C" fn collect_name(user_data: *mut c_void, name: *const c_char) -> u8 {
    let names = &mut *(user_data as *mut Vec<String>);
    names.push(CStr::from_ptr(name).to_string_lossy().into_owned());
    0
}

/// An opened device of a one-camera scenario.
struct Rig {
    sdk: FakeCameraSdk,
    factory: *mut TlFactoryHandle,
    info: *mut DeviceInfoHandle,
    device: *mut DeviceHandle,
}

impl Rig {
    fn new(scenario: FakeCameraScenario) -> Self {
        let sdk = FakeCameraSdk::new(scenario);
        let factory = factory(&sdk);
        let (status, _, infos) = enumerate(factory, 0);
        assert_eq!(status, StatusCode::Ok);
        let info = infos[0];
        let device =
            unsafe { vb_cam_tl_factory_create_device(factory, info, ptr::null_mut(), 0) }.payload;
        assert!(!device.is_null());
        assert!(unsafe { vb_cam_device_open(device, AccessModeSet::CONTROL.union(AccessModeSet::STREAM)) }.is_ok());
        Self {
            sdk,
            factory,
            info,
            device,
        }
    }

    fn node(&self, name: &CStr) -> *mut NodeHandle {
        let map = unsafe { vb_cam_device_node_map(self.device) }.payload;
        let node = unsafe { vb_cam_node_map_node(map, name.as_ptr()) };
        assert!(unsafe { vb_cam_node_map_delete(map) }.is_ok());
        assert!(node.is_ok(), "node {name:?} not found");
        node.payload
    }

    /// Open, prepare, register and queue one buffer on channel 0.
    fn grabber(&self, memory: &mut [u8]) -> *mut StreamGrabberHandle {
        let grabber = unsafe { vb_cam_device_stream_grabber(self.device, 0) }.payload;
        assert!(unsafe { vb_cam_stream_grabber_open(grabber) }.is_ok());
        assert!(unsafe { vb_cam_stream_grabber_prepare_grab(grabber) }.is_ok());
        let id = unsafe {
            vb_cam_stream_grabber_register_buffer(grabber, memory.as_mut_ptr(), memory.len())
        };
        assert!(id.is_ok());
        let queued =
            unsafe { vb_cam_stream_grabber_queue_buffer(grabber, id.payload, ptr::null_mut(), 0) };
        assert!(queued.is_ok());
        grabber
    }

    fn teardown(self) {
        unsafe {
            assert!(vb_cam_device_close(self.device).is_ok());
            assert!(vb_cam_device_delete(self.device).is_ok());
            assert!(vb_cam_device_info_delete(self.info).is_ok());
            assert!(vb_cam_tl_factory_delete(self.factory).is_ok());
        }
        assert_eq!(self.sdk.live_objects(), 0);
    }
}

#[test]
fn lifecycle_gates_factory_creation() {
    let _guard = serial();
    let sdk = std::sync::Arc::new(FakeCameraSdk::new(FakeCameraScenario::with_cameras(1)));
    vision_boundary_camera::install_backend(sdk.clone());

    let early = vb_cam_tl_factory_new();
    assert_eq!((early.is_known_exception, early.is_unknown_exception), (1, 0));
    assert!(early.payload.is_null());

    assert!(vb_cam_initialize().is_ok());
    assert_eq!(sdk.init_count(), 1);

    let len = unsafe { vb_cam_version_string(ptr::null_mut(), 0) };
    assert_eq!(len.payload, "7.4.0-fake".len());
    let mut buf = [0 as c_char; 32];
    assert!(unsafe { vb_cam_version_string(buf.as_mut_ptr(), buf.len()) }.is_ok());
    assert_eq!(text(&buf), "7.4.0-fake");

    let f = vb_cam_tl_factory_new();
    assert!(f.is_ok());
    assert!(unsafe { vb_cam_tl_factory_delete(f.payload) }.is_ok());

    assert!(vb_cam_terminate().is_ok());
    assert_eq!(sdk.terminate_count(), 1);
    assert_eq!(vb_cam_terminate().status, StatusCode::KnownException);
    CAMERA_SDK.uninstall();
    assert_eq!(sdk.live_objects(), 0);
}

#[test]
fn zero_devices_means_zero_callbacks() {
    let sdk = FakeCameraSdk::new(FakeCameraScenario::default());
    let f = factory(&sdk);
    let (status, count, infos) = enumerate(f, 0);
    assert_eq!((status, count), (StatusCode::Ok, 0));
    assert!(infos.is_empty());
    assert!(unsafe { vb_cam_tl_factory_delete(f) }.is_ok());
}

#[test]
fn failing_callback_stops_enumeration() {
    let sdk = FakeCameraSdk::new(FakeCameraScenario::with_cameras(3));
    let f = factory(&sdk);
    let (status, count, infos) = enumerate(f, 2);
    assert_eq!(status, StatusCode::CallbackFailed);
    assert_eq!(count, 0);
    assert_eq!(infos.len(), 2);

    for info in infos {
        assert!(unsafe { vb_cam_device_info_delete(info) }.is_ok());
    }
    assert!(unsafe { vb_cam_tl_factory_delete(f) }.is_ok());
    assert_eq!(sdk.live_objects(), 0);
}

#[test]
fn property_names_are_borrowed_strings() {
    let sdk = FakeCameraSdk::new(FakeCameraScenario::with_cameras(1));
    let f = factory(&sdk);
    let (_, _, infos) = enumerate(f, 0);
    let mut names: Vec<String> = Vec::new();
    let r = unsafe {
        vb_cam_device_info_property_names(
            infos[0],
            Some(collect_name),
            &mut names as *mut Vec<String> as *mut c_void,
        )
    };
    assert_eq!(r.payload, names.len());
    assert!(names.iter().any(|n| n == "SerialNumber"));
    assert!(names.iter().any(|n| n == "FriendlyName"));

    assert!(unsafe { vb_cam_device_info_delete(infos[0]) }.is_ok());
    assert!(unsafe { vb_cam_tl_factory_delete(f) }.is_ok());
}

#[test]
fn create_device_copies_error_description() {
    let sdk = FakeCameraSdk::new(FakeCameraScenario::with_cameras(1));
    let other = FakeCameraSdk::new(FakeCameraScenario {
        devices: vec![FakeDeviceSpec::camera("99", "acA1920-40gc")],
        ..FakeCameraScenario::default()
    });
    let f = factory(&sdk);
    let g = factory(&other);
    let (_, _, foreign) = enumerate(g, 0);

    let mut error = [0 as c_char; 256];
    let r = unsafe { vb_cam_tl_factory_create_device(f, foreign[0], error.as_mut_ptr(), error.len()) };
    assert_eq!(r.status, StatusCode::KnownException);
    assert!(r.payload.is_null());
    assert!(text(&error).starts_with("RuntimeException"));

    assert!(unsafe { vb_cam_device_info_delete(foreign[0]) }.is_ok());
    assert!(unsafe { vb_cam_tl_factory_delete(f) }.is_ok());
    assert!(unsafe { vb_cam_tl_factory_delete(g) }.is_ok());
}

#[test]
fn full_acquisition_round() {
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    assert_eq!(
        unsafe { vb_cam_device_num_stream_grabber_channels(rig.device) }.payload,
        1
    );
    let mut memory = vec![0u8; 640 * 480];
    let grabber = rig.grabber(&mut memory);
    let wait = unsafe { vb_cam_stream_grabber_wait_object(grabber) }.payload;

    assert_eq!(
        unsafe { vb_cam_wait_object_wait(wait, 0) }.payload,
        WaitOutcome::TimedOut
    );
    let nothing = unsafe { vb_cam_stream_grabber_retrieve_result(grabber) };
    assert!(nothing.is_ok());
    assert!(nothing.payload.is_null());

    let stream = rig.sdk.stream("21000000", 0);
    assert!(stream.emit_frame(FakeFrame::mono8(640, 480, 7)).is_some());
    assert_eq!(
        unsafe { vb_cam_wait_object_wait(wait, 1000) }.payload,
        WaitOutcome::Signaled
    );

    let result = unsafe { vb_cam_stream_grabber_retrieve_result(grabber) }.payload;
    assert!(!result.is_null());
    unsafe {
        assert_eq!(vb_cam_grab_result_status(result).payload, GrabStatus::Grabbed);
        assert_eq!(vb_cam_grab_result_payload_type(result).payload, PayloadType::Image);
        assert_eq!(vb_cam_grab_result_size_x(result).payload, 640);
        assert_eq!(vb_cam_grab_result_size_y(result).payload, 480);
        assert_eq!(vb_cam_grab_result_block_id(result).payload, 1);

        let size = vb_cam_grab_result_payload_size(result).payload;
        let bytes = vb_cam_grab_result_buffer(result);
        assert!(bytes.is_ok());
        assert_eq!(bytes.payload.len, size);
        assert!(bytes.payload.as_slice().iter().all(|&b| b == 7));

        let image = vb_cam_grab_result_image(result).payload;
        assert!(vb_cam_image_is_valid(image).payload);
        assert_eq!(vb_cam_image_pixel_type(image).payload, PixelType::Mono8);
        assert_eq!(vb_cam_image_width(image).payload, 640);
        assert_eq!(vb_cam_image_height(image).payload, 480);
        assert_eq!(vb_cam_image_stride(image).payload, 640);
        assert_eq!(vb_cam_image_buffer(image).payload.len, 640 * 480);
        assert!(vb_cam_image_delete(image).is_ok());

        let id = vb_cam_grab_result_buffer_id(result).payload;
        assert!(vb_cam_grab_result_delete(result).is_ok());
        assert!(vb_cam_stream_grabber_queue_buffer(grabber, id, ptr::null_mut(), 0).is_ok());
        assert_eq!(stream.queued_count(), 1);

        assert!(vb_cam_stream_grabber_finish_grab(grabber).is_ok());
        assert!(vb_cam_stream_grabber_close(grabber).is_ok());
        assert!(vb_cam_wait_object_delete(wait).is_ok());
        assert!(vb_cam_stream_grabber_delete(grabber).is_ok());
    }
    rig.teardown();
}

#[test]
fn sentinel_image_values_are_invalid_results() {
    let _guard = serial();
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    let mut memory = vec![0u8; 64];
    let grabber = rig.grabber(&mut memory);
    let stream = rig.sdk.stream("21000000", 0);
    stream.emit_frame(FakeFrame::failed(0xE100_0014, "frame incomplete").with_block_id(u64::MAX));

    let result = unsafe { vb_cam_stream_grabber_retrieve_result(grabber) }.payload;
    unsafe {
        assert_eq!(vb_cam_grab_result_status(result).payload, GrabStatus::Failed);
        assert_eq!(vb_cam_grab_result_error_code(result).payload, 0xE100_0014);

        let description = vb_string_new().payload;
        assert!(vb_cam_grab_result_error_description(result, description).is_ok());
        let bytes = vb_string_bytes(description).payload;
        assert_eq!(CStr::from_ptr(bytes).to_str().unwrap(), "frame incomplete");
        assert!(vb_string_delete(description).is_ok());

        let block = vb_cam_grab_result_block_id(result);
        assert_eq!(block.status, StatusCode::InvalidResult);
        assert_eq!((block.is_known_exception, block.is_unknown_exception), (0, 0));

        let image = vb_cam_grab_result_image(result).payload;
        assert!(!vb_cam_image_is_valid(image).payload);
        assert_eq!(vb_cam_image_width(image).status, StatusCode::InvalidResult);
        assert_eq!(vb_cam_image_size(image).status, StatusCode::InvalidResult);
        assert_eq!(vb_cam_image_stride(image).status, StatusCode::InvalidResult);
        assert_eq!(vb_cam_image_buffer(image).status, StatusCode::NullArgument);
        assert_eq!(vb_cam_image_pixel_type(image).payload, PixelType::Undefined);
        assert!(vb_cam_image_delete(image).is_ok());

        assert!(vb_cam_grab_result_delete(result).is_ok());
        assert!(vb_cam_stream_grabber_delete(grabber).is_ok());
    }
    rig.teardown();
}

#[test]
fn wait_returns_once_signaled() {
    const TIMEOUT: Duration = Duration::from_millis(2000);
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    let mut memory = vec![0u8; 640 * 480];
    let grabber = rig.grabber(&mut memory);
    let wait = unsafe { vb_cam_stream_grabber_wait_object(grabber) }.payload;

    let stream = rig.sdk.stream("21000000", 0);
    let start = Instant::now();
    let producer = thread::spawn(move || {
        thread::sleep(TIMEOUT / 2);
        stream.emit_frame(FakeFrame::mono8(640, 480, 1))
    });
    let outcome = unsafe { vb_cam_wait_object_wait(wait, TIMEOUT.as_millis() as u32) };
    let elapsed = start.elapsed();
    assert!(producer.join().unwrap().is_some());

    assert_eq!(outcome.payload, WaitOutcome::Signaled);
    assert!(elapsed >= TIMEOUT / 2);
    assert!(elapsed < TIMEOUT);

    unsafe {
        let result = vb_cam_stream_grabber_retrieve_result(grabber).payload;
        assert!(vb_cam_grab_result_delete(result).is_ok());
        assert!(vb_cam_wait_object_delete(wait).is_ok());
        assert!(vb_cam_stream_grabber_delete(grabber).is_ok());
    }
    rig.teardown();
}

#[test]
fn cancel_grab_cancels_the_wait() {
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    let mut memory = vec![0u8; 16];
    let grabber = rig.grabber(&mut memory);
    let wait = unsafe { vb_cam_stream_grabber_wait_object(grabber) }.payload;
    unsafe {
        assert!(vb_cam_stream_grabber_cancel_grab(grabber).is_ok());
        assert_eq!(vb_cam_wait_object_wait(wait, 1000).payload, WaitOutcome::Canceled);

        let result = vb_cam_stream_grabber_retrieve_result(grabber).payload;
        assert_eq!(vb_cam_grab_result_status(result).payload, GrabStatus::Canceled);
        assert!(vb_cam_grab_result_delete(result).is_ok());
        assert!(vb_cam_wait_object_delete(wait).is_ok());
        assert!(vb_cam_stream_grabber_delete(grabber).is_ok());
    }
    rig.teardown();
}

#[test]
fn queue_failure_copies_description() {
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    let mut memory = vec![0u8; 16];
    let grabber = rig.grabber(&mut memory);
    let mut error = [0 as c_char; 128];
    let r = unsafe {
        vb_cam_stream_grabber_queue_buffer(
            grabber,
            vision_boundary_camera::StreamBufferId(42),
            error.as_mut_ptr(),
            error.len(),
        )
    };
    assert_eq!(r.status, StatusCode::KnownException);
    assert!(text(&error).contains("not registered"));
    assert!(unsafe { vb_cam_stream_grabber_delete(grabber) }.is_ok());
    rig.teardown();
}

#[test]
fn downcasts_consume_their_slot() {
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));

    let mut width = rig.node(c"Width");
    let int = unsafe { vb_cam_node_to_integer(&mut width) };
    assert!(int.is_ok());
    assert!(width.is_null());
    assert_eq!(
        unsafe { vb_cam_node_delete(width) }.status,
        StatusCode::NullArgument
    );
    assert_eq!(unsafe { vb_cam_integer_node_value(int.payload) }.payload, 640);
    assert!(unsafe { vb_cam_integer_node_delete(int.payload) }.is_ok());

    let mut format = rig.node(c"PixelFormat");
    let wrong = unsafe { vb_cam_node_to_integer(&mut format) };
    assert_eq!(wrong.status, StatusCode::InvalidResult);
    assert!(wrong.payload.is_null());
    assert!(format.is_null());
    assert_eq!(
        unsafe { vb_cam_node_delete(format) }.status,
        StatusCode::NullArgument
    );

    let mut format = rig.node(c"PixelFormat");
    let en = unsafe { vb_cam_node_to_enumeration(&mut format) }.payload;
    let mut buf = [0 as c_char; 32];
    unsafe {
        assert!(vb_cam_enumeration_node_value(en, buf.as_mut_ptr(), buf.len()).is_ok());
        assert_eq!(text(&buf), "Mono8");
        assert!(vb_cam_enumeration_node_set_value(en, c"RGB8packed".as_ptr()).is_ok());
        let bad = vb_cam_enumeration_node_set_value(en, c"YUV422".as_ptr());
        assert_eq!(bad.is_known_exception, 1);

        let mut entries: Vec<*mut NodeHandle> = Vec::new();
        let r = vb_cam_enumeration_node_entries(
            en,
            Some(collect_node),
            &mut entries as *mut Vec<*mut NodeHandle> as *mut c_void,
        );
        assert_eq!(r.payload, 4);
        assert_eq!(
            vb_cam_node_principal_interface_type(entries[0]).payload,
            InterfaceType::IEnumEntry
        );
        for entry in entries {
            assert!(vb_cam_node_delete(entry).is_ok());
        }
        assert!(vb_cam_enumeration_node_delete(en).is_ok());
    }
    rig.teardown();
}

#[test]
fn injected_failures_set_exactly_one_flag() {
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    let mut exposure = rig.node(c"ExposureTime");
    let float = unsafe { vb_cam_node_to_float(&mut exposure) }.payload;

    rig.sdk.inject_on(
        "float.value",
        Injection::Error(SdkError::known("AccessException: node not readable")),
    );
    let known = unsafe { vb_cam_float_node_value(float) };
    assert_eq!((known.is_known_exception, known.is_unknown_exception), (1, 0));
    assert_eq!(known.payload, 0.0);

    rig.sdk.inject_on("float.value", Injection::Panic);
    let unknown = unsafe { vb_cam_float_node_value(float) };
    assert_eq!((unknown.is_known_exception, unknown.is_unknown_exception), (0, 1));
    assert_eq!(unknown.status, StatusCode::UnknownException);

    rig.sdk.inject_on("float.value", Injection::None);
    assert_eq!(unsafe { vb_cam_float_node_value(float) }.payload, 5000.0);
    assert!(unsafe { vb_cam_float_node_delete(float) }.is_ok());
    rig.teardown();
}

#[test]
fn unmapped_interface_is_enum_not_matched() {
    let mut spec = FakeDeviceSpec::camera("5", "acA640-120gm");
    let mut odd = FakeNodeSpec::integer("SequencerSetSelector", 0, 0, 15);
    odd.interface = Some(42);
    spec.nodes.push(odd);
    let rig = Rig::new(FakeCameraScenario {
        devices: vec![spec],
        ..FakeCameraScenario::default()
    });

    let node = rig.node(c"SequencerSetSelector");
    let r = unsafe { vb_cam_node_principal_interface_type(node) };
    assert_eq!(r.status, StatusCode::EnumNotMatched);
    assert_eq!((r.is_known_exception, r.is_unknown_exception), (0, 0));

    let mut name = [0 as c_char; 64];
    let n = unsafe { vb_cam_node_name(node, true, name.as_mut_ptr(), name.len()) };
    assert_eq!(text(&name), "Device::SequencerSetSelector");
    assert_eq!(n.payload, "Device::SequencerSetSelector".len());
    assert!(unsafe { vb_cam_node_delete(node) }.is_ok());
    rig.teardown();
}

#[test]
fn transport_layer_nodes_are_reachable() {
    let sdk = FakeCameraSdk::new(FakeCameraScenario::with_cameras(0));
    let f = factory(&sdk);
    unsafe {
        let tl = vb_cam_tl_factory_create_gige_transport_layer(f).payload;
        let map = vb_cam_transport_layer_node_map(tl).payload;
        let mut nodes: Vec<*mut NodeHandle> = Vec::new();
        let r = vb_cam_node_map_nodes(
            map,
            Some(collect_node),
            &mut nodes as *mut Vec<*mut NodeHandle> as *mut c_void,
        );
        assert_eq!(r.payload, 2);
        for node in nodes {
            assert!(vb_cam_node_delete(node).is_ok());
        }

        let mut discovery = vb_cam_node_map_node(map, c"DeviceDiscovery".as_ptr()).payload;
        let command = vb_cam_node_to_command(&mut discovery).payload;
        assert!(vb_cam_command_node_execute(command).is_ok());
        assert!(vb_cam_command_node_delete(command).is_ok());

        assert!(vb_cam_node_map_delete(map).is_ok());
        assert!(vb_cam_transport_layer_delete(tl).is_ok());
        assert!(vb_cam_tl_factory_delete(f).is_ok());
    }
    assert_eq!(sdk.live_objects(), 0);
}

#[test]
fn node_api_round_trip_leaves_nothing_alive() {
    let _guard = serial();
    let strings = live_string_handles();
    let rig = Rig::new(FakeCameraScenario::with_cameras(1));
    assert!(rig.sdk.live_objects() > 0);

    unsafe {
        let map = vb_cam_device_node_map(rig.device).payload;
        let mut nodes: Vec<*mut NodeHandle> = Vec::new();
        let r = vb_cam_node_map_nodes(
            map,
            Some(collect_node),
            &mut nodes as *mut Vec<*mut NodeHandle> as *mut c_void,
        );
        assert!(r.is_ok());
        for node in nodes {
            assert!(vb_cam_node_delete(node).is_ok());
        }

        let mut buf = [0 as c_char; 16];
        let mut width = vb_cam_node_map_node(map, c"Width".as_ptr()).payload;
        let int = vb_cam_node_to_integer(&mut width).payload;
        assert!(vb_cam_integer_node_unit(int, buf.as_mut_ptr(), buf.len()).is_ok());
        assert_eq!(text(&buf), "px");
        assert!(vb_cam_integer_node_delete(int).is_ok());

        let mut exposure = vb_cam_node_map_node(map, c"ExposureTime".as_ptr()).payload;
        let float = vb_cam_node_to_float(&mut exposure).payload;
        assert!(vb_cam_float_node_unit(float, buf.as_mut_ptr(), buf.len()).is_ok());
        assert_eq!(text(&buf), "us");
        assert!(vb_cam_float_node_delete(float).is_ok());

        let mut model = vb_cam_node_map_node(map, c"DeviceModelName".as_ptr()).payload;
        let string = vb_cam_node_to_string(&mut model).payload;
        assert!(vb_cam_string_node_value(string, buf.as_mut_ptr(), buf.len()).is_ok());
        assert!(vb_cam_string_node_delete(string).is_ok());

        let mut reverse = vb_cam_node_map_node(map, c"ReverseX".as_ptr()).payload;
        let boolean = vb_cam_node_to_boolean(&mut reverse).payload;
        assert!(vb_cam_boolean_node_set_value(boolean, true).is_ok());
        assert!(vb_cam_boolean_node_delete(boolean).is_ok());

        let mut format = vb_cam_node_map_node(map, c"PixelFormat".as_ptr()).payload;
        let en = vb_cam_node_to_enumeration(&mut format).payload;
        let mut symbols: Vec<String> = Vec::new();
        let r = vb_cam_enumeration_node_settable_values(
            en,
            Some(collect_name),
            &mut symbols as *mut Vec<String> as *mut c_void,
        );
        assert_eq!(r.payload, 3);
        assert!(!symbols.iter().any(|s| s == "Mono12p"));
        let mono12 = vb_cam_enumeration_node_set_value(en, c"Mono12p".as_ptr());
        assert_eq!(mono12.is_known_exception, 1);
        let mut entries: Vec<*mut NodeHandle> = Vec::new();
        vb_cam_enumeration_node_entries(
            en,
            Some(collect_node),
            &mut entries as *mut Vec<*mut NodeHandle> as *mut c_void,
        );
        for entry in entries {
            assert!(vb_cam_node_delete(entry).is_ok());
        }
        assert!(vb_cam_enumeration_node_delete(en).is_ok());

        // A failed cast consumes the node as well.
        let mut start = vb_cam_node_map_node(map, c"AcquisitionStart".as_ptr()).payload;
        assert!(vb_cam_node_to_float(&mut start).payload.is_null());
        let mut start = vb_cam_node_map_node(map, c"AcquisitionStart".as_ptr()).payload;
        let command = vb_cam_node_to_command(&mut start).payload;
        assert!(vb_cam_command_node_execute(command).is_ok());
        assert!(vb_cam_command_node_delete(command).is_ok());
        assert!(vb_cam_node_map_delete(map).is_ok());

        let copy = vb_cam_device_info_copy(rig.info).payload;
        assert!(vb_cam_device_info_property_value(
            copy,
            c"SerialNumber".as_ptr(),
            buf.as_mut_ptr(),
            buf.len()
        )
        .is_ok());
        assert_eq!(text(&buf), "21000000");
        assert!(vb_cam_device_info_delete(copy).is_ok());

        let first = vb_cam_tl_factory_create_first_device(rig.factory, ptr::null_mut(), 0);
        assert!(first.is_ok());
        assert!(vb_cam_device_delete(first.payload).is_ok());
    }

    let mut memory = vec![0u8; 64];
    let grabber = rig.grabber(&mut memory);
    rig.sdk
        .stream("21000000", 0)
        .emit_frame(FakeFrame::mono8(4, 4, 1).with_offset(16, 8).with_padding(2, 0));
    unsafe {
        let result = vb_cam_stream_grabber_retrieve_result(grabber).payload;
        assert!(vb_cam_grab_result_grab_succeeded(result).payload);
        assert_eq!(vb_cam_grab_result_buffer_size(result).payload, 64);
        assert_eq!(vb_cam_grab_result_payload_size(result).payload, 16);
        assert_eq!(vb_cam_grab_result_offset_x(result).payload, 16);
        assert_eq!(vb_cam_grab_result_offset_y(result).payload, 8);
        assert_eq!(vb_cam_grab_result_padding_x(result).payload, 2);
        assert_eq!(vb_cam_grab_result_padding_y(result).payload, 0);

        let description = vb_string_new().payload;
        assert_eq!(live_string_handles(), strings + 1);
        assert!(vb_cam_grab_result_error_description(result, description).is_ok());
        assert!(vb_string_delete(description).is_ok());

        assert!(vb_cam_grab_result_delete(result).is_ok());
        assert!(vb_cam_stream_grabber_cancel_grab(grabber).is_ok());
        assert!(vb_cam_stream_grabber_finish_grab(grabber).is_ok());
        assert!(vb_cam_stream_grabber_close(grabber).is_ok());
        assert!(vb_cam_stream_grabber_delete(grabber).is_ok());
    }
    rig.teardown();
    assert_eq!(live_string_handles(), strings);
}
