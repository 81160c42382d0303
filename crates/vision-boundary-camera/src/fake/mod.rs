//! In-process camera SDK driven by a [`FakeCameraScenario`].
//!
//! Used by the tests and the CLI in place of a vendor SDK. Devices, their
//! properties and parameter trees come from the scenario; frames are pushed
//! by the test through [`FakeStream::emit_frame`].
//!
//! Failures are injected per operation name with
//! [`FakeCameraSdk::inject_on`]. Names are `"<object>.<operation>"`, e.g.
//! `"sdk.initialize"`, `"factory.enumerate_devices"`, `"device.open"`,
//! `"device_info.property_value"`, `"node.visibility"`, `"integer.value"`,
//! `"stream.queue_buffer"` or `"grab_result.block_id"`.
//!
//! Every SDK object the fake hands out (factory, device info, device,
//! transport layer, node map, node, stream grabber, grab result, image)
//! holds an [`AllocationToken`], so [`FakeCameraSdk::live_objects`] drops
//! back to zero once the caller has released everything.

mod nodes;
mod scenario;
mod stream;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use vision_boundary_core::{SdkError, SdkResult};

pub use nodes::{FakeNode, FakeNodeMap};
pub use scenario::{FakeCameraScenario, FakeDeviceSpec, FakeNodeKind, FakeNodeSpec, ScenarioIoError};
pub use stream::{FakeFrame, FakeGrabResult, FakeImage, FakeStream, FakeStreamGrabber, FakeWaitObject};

use crate::sdk::{
    CameraSdk, Device, DeviceInfo, NodeMap, StreamGrabber, TransportLayer, TransportLayerFactory,
};
use crate::types::NativeAccessModeSet;
use stream::StreamRegistry;

/// How calls to one operation fail, if at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Injection {
    #[default]
    None,
    Error(SdkError),
    Panic,
}

/// Counts SDK objects that are still alive.
#[derive(Clone, Debug, Default)]
pub struct AllocationCounter {
    live: Arc<AtomicUsize>,
}

impl AllocationCounter {
    pub fn track(&self) -> AllocationToken {
        self.live.fetch_add(1, Ordering::SeqCst);
        AllocationToken {
            live: self.live.clone(),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Held by a tracked object; decrements the counter when dropped.
#[derive(Debug)]
pub struct AllocationToken {
    live: Arc<AtomicUsize>,
}

impl Drop for AllocationToken {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State shared by every object of one fake SDK.
#[derive(Default)]
pub(crate) struct World {
    injections: Mutex<HashMap<String, Injection>>,
    allocations: AllocationCounter,
}

impl World {
    pub(crate) fn check(&self, op: &str) -> SdkResult<()> {
        let injection = self
            .injections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(op)
            .cloned();
        match injection {
            None | Some(Injection::None) => Ok(()),
            Some(Injection::Error(err)) => Err(err),
            Some(Injection::Panic) => panic!("fake camera SDK panicked in {op}"),
        }
    }

    pub(crate) fn track(&self) -> AllocationToken {
        self.allocations.track()
    }

    pub(crate) fn live(&self) -> usize {
        self.allocations.live()
    }
}

/// Scenario-driven [`CameraSdk`].
pub struct FakeCameraSdk {
    scenario: Arc<FakeCameraScenario>,
    world: Arc<World>,
    streams: Arc<StreamRegistry>,
    initialized: AtomicUsize,
    terminated: AtomicUsize,
}

impl FakeCameraSdk {
    pub fn new(scenario: FakeCameraScenario) -> Self {
        let world = Arc::new(World::default());
        let streams = Arc::new(StreamRegistry::new(
            scenario.stream_nodes.clone(),
            world.clone(),
        ));
        Self {
            scenario: Arc::new(scenario),
            world,
            streams,
            initialized: AtomicUsize::new(0),
            terminated: AtomicUsize::new(0),
        }
    }

    pub fn scenario(&self) -> &FakeCameraScenario {
        &self.scenario
    }

    /// Make every later call of `op` behave as `injection` says.
    /// [`Injection::None`] clears it.
    pub fn inject_on(&self, op: &str, injection: Injection) {
        let mut injections = self
            .world
            .injections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if injection == Injection::None {
            injections.remove(op);
        } else {
            injections.insert(op.to_string(), injection);
        }
    }

    pub fn allocations(&self) -> AllocationCounter {
        self.world.allocations.clone()
    }

    pub fn live_objects(&self) -> usize {
        self.world.live()
    }

    /// Test-side control of stream `channel` of the device with `serial`.
    pub fn stream(&self, serial: &str, channel: u64) -> FakeStream {
        FakeStream::new(self.streams.get(serial, channel))
    }

    pub fn init_count(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn terminate_count(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl CameraSdk for FakeCameraSdk {
    fn initialize(&self) -> SdkResult<()> {
        self.world.check("sdk.initialize")?;
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) -> SdkResult<()> {
        self.world.check("sdk.terminate")?;
        self.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn version_string(&self) -> SdkResult<String> {
        self.world.check("sdk.version_string")?;
        Ok(self.scenario.version.clone())
    }

    fn transport_layer_factory(&self) -> SdkResult<Arc<dyn TransportLayerFactory>> {
        self.world.check("sdk.transport_layer_factory")?;
        Ok(Arc::new(FakeTlFactory {
            scenario: self.scenario.clone(),
            world: self.world.clone(),
            streams: self.streams.clone(),
            _token: self.world.track(),
        }))
    }
}

struct FakeTlFactory {
    scenario: Arc<FakeCameraScenario>,
    world: Arc<World>,
    streams: Arc<StreamRegistry>,
    _token: AllocationToken,
}

impl FakeTlFactory {
    fn device(&self, spec: &FakeDeviceSpec) -> Box<dyn Device> {
        Box::new(FakeDevice {
            spec: spec.clone(),
            open: false,
            node_map: Arc::new(FakeNodeMap::new(&spec.nodes, "Device", &self.world)),
            world: self.world.clone(),
            streams: self.streams.clone(),
            _token: self.world.track(),
        })
    }
}

impl TransportLayerFactory for FakeTlFactory {
    fn enumerate_devices(&self) -> SdkResult<Vec<Box<dyn DeviceInfo>>> {
        self.world.check("factory.enumerate_devices")?;
        debug!("fake enumeration found {} devices", self.scenario.devices.len());
        Ok(self
            .scenario
            .devices
            .iter()
            .map(|spec| FakeDeviceInfo::boxed(spec.properties.clone(), &self.world))
            .collect())
    }

    fn create_device(&self, info: &dyn DeviceInfo) -> SdkResult<Box<dyn Device>> {
        self.world.check("factory.create_device")?;
        let serial = info.property_value("SerialNumber")?;
        let spec = self
            .scenario
            .devices
            .iter()
            .find(|spec| spec.serial().is_some() && spec.serial() == serial.as_deref())
            .ok_or_else(|| {
                SdkError::known(
                    "RuntimeException: no device is available or no device contains \
                     the provided device info properties",
                )
            })?;
        Ok(self.device(spec))
    }

    fn create_first_device(&self) -> SdkResult<Box<dyn Device>> {
        self.world.check("factory.create_first_device")?;
        let spec = self.scenario.devices.first().ok_or_else(|| {
            SdkError::known("RuntimeException: no device is available")
        })?;
        Ok(self.device(spec))
    }

    fn create_gige_transport_layer(&self) -> SdkResult<Box<dyn TransportLayer>> {
        self.world.check("factory.create_gige_transport_layer")?;
        Ok(Box::new(FakeTransportLayer {
            node_map: Arc::new(FakeNodeMap::new(
                &self.scenario.transport_layer_nodes,
                "TransportLayer",
                &self.world,
            )),
            world: self.world.clone(),
            _token: self.world.track(),
        }))
    }
}

struct FakeDeviceInfo {
    properties: BTreeMap<String, String>,
    world: Arc<World>,
    _token: AllocationToken,
}

impl FakeDeviceInfo {
    fn boxed(properties: BTreeMap<String, String>, world: &Arc<World>) -> Box<dyn DeviceInfo> {
        Box::new(Self {
            properties,
            world: world.clone(),
            _token: world.track(),
        })
    }
}

impl DeviceInfo for FakeDeviceInfo {
    fn property_names(&self) -> SdkResult<Vec<String>> {
        self.world.check("device_info.property_names")?;
        Ok(self.properties.keys().cloned().collect())
    }

    fn property_value(&self, name: &str) -> SdkResult<Option<String>> {
        self.world.check("device_info.property_value")?;
        Ok(self.properties.get(name).cloned())
    }

    fn clone_info(&self) -> Box<dyn DeviceInfo> {
        Self::boxed(self.properties.clone(), &self.world)
    }
}

struct FakeDevice {
    spec: FakeDeviceSpec,
    open: bool,
    node_map: Arc<FakeNodeMap>,
    world: Arc<World>,
    streams: Arc<StreamRegistry>,
    _token: AllocationToken,
}

impl Device for FakeDevice {
    fn open(&mut self, modes: NativeAccessModeSet) -> SdkResult<()> {
        self.world.check("device.open")?;
        if let Some(reason) = &self.spec.open_error {
            return Err(SdkError::known(reason.clone()));
        }
        if self.open {
            return Err(SdkError::known(
                "RuntimeException: the device is already open",
            ));
        }
        if modes.0 == 0 {
            return Err(SdkError::known(
                "InvalidArgumentException: no access mode requested",
            ));
        }
        self.open = true;
        debug!(
            "fake device {} opened with modes {:#x}",
            self.spec.serial().unwrap_or("?"),
            modes.0
        );
        Ok(())
    }

    fn close(&mut self) -> SdkResult<()> {
        self.world.check("device.close")?;
        self.open = false;
        Ok(())
    }

    fn num_stream_grabber_channels(&self) -> SdkResult<u64> {
        self.world.check("device.num_stream_grabber_channels")?;
        Ok(self.spec.stream_grabber_channels)
    }

    fn stream_grabber(&mut self, index: u64) -> SdkResult<Box<dyn StreamGrabber>> {
        self.world.check("device.stream_grabber")?;
        if !self.open {
            return Err(SdkError::known(
                "LogicalErrorException: the device is not open",
            ));
        }
        if index >= self.spec.stream_grabber_channels {
            return Err(SdkError::known(format!(
                "OutOfRangeException: stream grabber index {index} out of range"
            )));
        }
        let serial = self.spec.serial().unwrap_or_default();
        Ok(Box::new(FakeStreamGrabber::new(
            self.streams.get(serial, index),
            self.world.track(),
        )))
    }

    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>> {
        self.world.check("device.node_map")?;
        Ok(self.node_map.handle())
    }
}

struct FakeTransportLayer {
    node_map: Arc<FakeNodeMap>,
    world: Arc<World>,
    _token: AllocationToken,
}

impl TransportLayer for FakeTransportLayer {
    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>> {
        self.world.check("transport_layer.node_map")?;
        Ok(self.node_map.handle())
    }
}
