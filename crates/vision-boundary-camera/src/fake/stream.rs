//! Simulated stream grabbers, grab results and wait objects.
//!
//! A stream is identified by device serial number and channel. The grabber
//! handed to the caller and the [`FakeStream`] controller used by tests
//! share one state, so a test can emit frames into buffers the caller has
//! queued through the boundary.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use vision_boundary_core::{SdkError, SdkResult, WaitOutcome};

use super::nodes::FakeNodeMap;
use super::scenario::FakeNodeSpec;
use super::{AllocationToken, World};
use crate::sdk::{
    GrabResult, ImageRef, NodeMap, RegisteredBuffer, StreamBufferId, StreamGrabber, WaitObject,
};
use crate::types::{NativeGrabStatus, NativePayloadType, NativePixelType};

const STATUS_GRABBED: NativeGrabStatus = NativeGrabStatus(2);
const STATUS_CANCELED: NativeGrabStatus = NativeGrabStatus(3);
const STATUS_FAILED: NativeGrabStatus = NativeGrabStatus(4);
const PAYLOAD_IMAGE: NativePayloadType = NativePayloadType(0);
const PIXEL_UNDEFINED: NativePixelType = NativePixelType(-1);
const PIXEL_MONO8: NativePixelType = NativePixelType(0x0108_0001);

/// One frame as the camera would deliver it.
#[derive(Clone, Debug, PartialEq)]
pub struct FakeFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pixel_type: NativePixelType,
    pub payload_type: NativePayloadType,
    pub status: NativeGrabStatus,
    pub error_code: u32,
    pub error_description: String,
    pub time_stamp: u64,
    /// `None` lets the stream number frames itself.
    pub block_id: Option<u64>,
    pub offset_x: u32,
    pub offset_y: u32,
    pub padding_x: u32,
    pub padding_y: u32,
}

impl FakeFrame {
    /// A grabbed Mono8 image filled with `fill`.
    pub fn mono8(width: u32, height: u32, fill: u8) -> Self {
        Self {
            data: vec![fill; width as usize * height as usize],
            width,
            height,
            pixel_type: PIXEL_MONO8,
            payload_type: PAYLOAD_IMAGE,
            status: STATUS_GRABBED,
            error_code: 0,
            error_description: String::new(),
            time_stamp: 0,
            block_id: None,
            offset_x: 0,
            offset_y: 0,
            padding_x: 0,
            padding_y: 0,
        }
    }

    /// A failed grab carrying no image.
    pub fn failed(error_code: u32, description: &str) -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            pixel_type: PIXEL_UNDEFINED,
            payload_type: PAYLOAD_IMAGE,
            status: STATUS_FAILED,
            error_code,
            error_description: description.to_string(),
            time_stamp: 0,
            block_id: None,
            offset_x: 0,
            offset_y: 0,
            padding_x: 0,
            padding_y: 0,
        }
    }

    fn canceled() -> Self {
        Self {
            status: STATUS_CANCELED,
            ..Self::failed(0, "")
        }
    }

    pub fn with_block_id(mut self, block_id: u64) -> Self {
        self.block_id = Some(block_id);
        self
    }

    pub fn with_time_stamp(mut self, time_stamp: u64) -> Self {
        self.time_stamp = time_stamp;
        self
    }

    /// Position of the area of interest on the sensor.
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    /// Bytes of padding after each line and after the last line.
    pub fn with_padding(mut self, x: u32, y: u32) -> Self {
        self.padding_x = x;
        self.padding_y = y;
        self
    }
}

#[derive(Default)]
struct WaitState {
    pending: usize,
    canceled: bool,
}

/// Counting event with cancellation, as a grabber's result-ready object.
#[derive(Default)]
pub struct FakeWaitObject {
    state: Mutex<WaitState>,
    ready: Condvar,
}

impl FakeWaitObject {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WaitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn signal(&self) {
        self.lock().pending += 1;
        self.ready.notify_all();
    }

    pub(crate) fn consume(&self) {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);
    }

    /// Wake every waiter with [`WaitOutcome::Canceled`] until reset.
    pub fn cancel(&self) {
        self.lock().canceled = true;
        self.ready.notify_all();
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        state.pending = 0;
        state.canceled = false;
    }
}

impl WaitObject for FakeWaitObject {
    fn wait(&self, timeout: Duration) -> SdkResult<WaitOutcome> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if state.canceled {
                return Ok(WaitOutcome::Canceled);
            }
            if state.pending > 0 {
                return Ok(WaitOutcome::Signaled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            state = self
                .ready
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}

struct Completed {
    id: StreamBufferId,
    buffer: RegisteredBuffer,
    payload_size: usize,
    frame: FakeFrame,
}

#[derive(Default)]
struct Inner {
    open: bool,
    prepared: bool,
    next_buffer: u64,
    next_block: u64,
    registered: HashMap<StreamBufferId, RegisteredBuffer>,
    queued: VecDeque<StreamBufferId>,
    ready: VecDeque<Completed>,
}

pub(crate) struct StreamState {
    inner: Mutex<Inner>,
    wait: Arc<FakeWaitObject>,
    node_map: Arc<FakeNodeMap>,
    world: Arc<World>,
}

impl StreamState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Streams of every device, created on first use.
pub(crate) struct StreamRegistry {
    streams: Mutex<HashMap<(String, u64), Arc<StreamState>>>,
    nodes: Vec<FakeNodeSpec>,
    world: Arc<World>,
}

impl StreamRegistry {
    pub(crate) fn new(nodes: Vec<FakeNodeSpec>, world: Arc<World>) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            nodes,
            world,
        }
    }

    pub(crate) fn get(&self, serial: &str, channel: u64) -> Arc<StreamState> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        streams
            .entry((serial.to_string(), channel))
            .or_insert_with(|| {
                Arc::new(StreamState {
                    inner: Mutex::new(Inner::default()),
                    wait: Arc::new(FakeWaitObject::new()),
                    node_map: Arc::new(FakeNodeMap::new(&self.nodes, "Stream", &self.world)),
                    world: self.world.clone(),
                })
            })
            .clone()
    }
}

/// Test-side control of one stream.
#[derive(Clone)]
pub struct FakeStream {
    state: Arc<StreamState>,
}

impl FakeStream {
    pub(crate) fn new(state: Arc<StreamState>) -> Self {
        Self { state }
    }

    /// Deliver `frame` into the oldest queued buffer and signal the wait
    /// object. Returns the filled buffer, or `None` when nothing is queued.
    pub fn emit_frame(&self, mut frame: FakeFrame) -> Option<StreamBufferId> {
        let id = {
            let mut inner = self.state.lock();
            let id = inner.queued.pop_front()?;
            let buffer = *inner.registered.get(&id)?;
            let n = frame.data.len().min(buffer.len());
            // Safety: queued buffers are registered and the caller keeps
            // registered memory alive and untouched.
            unsafe { buffer.as_mut_slice()[..n].copy_from_slice(&frame.data[..n]) };
            if frame.block_id.is_none() {
                inner.next_block += 1;
                frame.block_id = Some(inner.next_block);
            }
            frame.data = Vec::new();
            inner.ready.push_back(Completed {
                id,
                buffer,
                payload_size: n,
                frame,
            });
            id
        };
        debug!("fake stream filled buffer {}", id.0);
        self.state.wait.signal();
        Some(id)
    }

    pub fn queued_count(&self) -> usize {
        self.state.lock().queued.len()
    }

    pub fn ready_count(&self) -> usize {
        self.state.lock().ready.len()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn wait_object(&self) -> Arc<FakeWaitObject> {
        self.state.wait.clone()
    }
}

/// [`StreamGrabber`] over a shared fake stream.
pub struct FakeStreamGrabber {
    state: Arc<StreamState>,
    _token: AllocationToken,
}

impl FakeStreamGrabber {
    pub(crate) fn new(state: Arc<StreamState>, token: AllocationToken) -> Self {
        Self {
            state,
            _token: token,
        }
    }

    fn check(&self, op: &str) -> SdkResult<()> {
        self.state.world.check(op)
    }
}

impl Drop for FakeStreamGrabber {
    fn drop(&mut self) {
        // Deleting a grabber releases its channel and forgets the caller's
        // buffers.
        let mut inner = self.state.lock();
        inner.open = false;
        inner.prepared = false;
        inner.queued.clear();
        inner.ready.clear();
        inner.registered.clear();
        drop(inner);
        self.state.wait.reset();
    }
}

fn not_prepared() -> SdkError {
    SdkError::known("LogicalErrorException: the grab has not been prepared")
}

impl StreamGrabber for FakeStreamGrabber {
    fn open(&mut self) -> SdkResult<()> {
        self.check("stream.open")?;
        let mut inner = self.state.lock();
        if inner.open {
            return Err(SdkError::known(
                "RuntimeException: the stream grabber is already open",
            ));
        }
        inner.open = true;
        Ok(())
    }

    fn close(&mut self) -> SdkResult<()> {
        self.check("stream.close")?;
        let mut inner = self.state.lock();
        inner.open = false;
        inner.prepared = false;
        Ok(())
    }

    fn node_map(&self) -> SdkResult<Arc<dyn NodeMap>> {
        self.check("stream.node_map")?;
        Ok(self.state.node_map.handle())
    }

    fn prepare_grab(&mut self) -> SdkResult<()> {
        self.check("stream.prepare_grab")?;
        let mut inner = self.state.lock();
        if !inner.open {
            return Err(SdkError::known(
                "LogicalErrorException: the stream grabber is not open",
            ));
        }
        inner.prepared = true;
        drop(inner);
        self.state.wait.reset();
        Ok(())
    }

    fn cancel_grab(&mut self) -> SdkResult<()> {
        self.check("stream.cancel_grab")?;
        let mut inner = self.state.lock();
        while let Some(id) = inner.queued.pop_front() {
            if let Some(&buffer) = inner.registered.get(&id) {
                inner.ready.push_back(Completed {
                    id,
                    buffer,
                    payload_size: 0,
                    frame: FakeFrame::canceled(),
                });
            }
        }
        drop(inner);
        self.state.wait.cancel();
        Ok(())
    }

    fn finish_grab(&mut self) -> SdkResult<()> {
        self.check("stream.finish_grab")?;
        let mut inner = self.state.lock();
        inner.prepared = false;
        inner.queued.clear();
        inner.ready.clear();
        inner.registered.clear();
        drop(inner);
        self.state.wait.reset();
        Ok(())
    }

    fn register_buffer(&mut self, buffer: RegisteredBuffer) -> SdkResult<StreamBufferId> {
        self.check("stream.register_buffer")?;
        if buffer.is_empty() || buffer.as_ptr().is_null() {
            return Err(SdkError::known(
                "InvalidArgumentException: buffer must not be empty",
            ));
        }
        let mut inner = self.state.lock();
        if !inner.prepared {
            return Err(not_prepared());
        }
        inner.next_buffer += 1;
        let id = StreamBufferId(inner.next_buffer);
        inner.registered.insert(id, buffer);
        Ok(id)
    }

    fn queue_buffer(&mut self, id: StreamBufferId) -> SdkResult<()> {
        self.check("stream.queue_buffer")?;
        let mut inner = self.state.lock();
        if !inner.prepared {
            return Err(not_prepared());
        }
        if !inner.registered.contains_key(&id) {
            return Err(SdkError::known(format!(
                "InvalidArgumentException: buffer {} is not registered",
                id.0
            )));
        }
        let busy = inner.queued.contains(&id) || inner.ready.iter().any(|c| c.id == id);
        if busy {
            return Err(SdkError::known(format!(
                "LogicalErrorException: buffer {} is already queued",
                id.0
            )));
        }
        inner.queued.push_back(id);
        Ok(())
    }

    fn wait_object(&self) -> SdkResult<Arc<dyn WaitObject>> {
        self.check("stream.wait_object")?;
        Ok(self.state.wait.clone())
    }

    fn retrieve_result(&mut self) -> SdkResult<Option<Box<dyn GrabResult>>> {
        self.check("stream.retrieve_result")?;
        let completed = self.state.lock().ready.pop_front();
        Ok(completed.map(|completed| {
            self.state.wait.consume();
            Box::new(FakeGrabResult {
                completed,
                world: self.state.world.clone(),
                _token: self.state.world.track(),
            }) as Box<dyn GrabResult>
        }))
    }
}

/// Completed grab, pointing into the caller's registered buffer.
pub struct FakeGrabResult {
    completed: Completed,
    world: Arc<World>,
    _token: AllocationToken,
}

impl FakeGrabResult {
    fn frame(&self) -> &FakeFrame {
        &self.completed.frame
    }
}

impl GrabResult for FakeGrabResult {
    fn buffer(&self) -> SdkResult<&[u8]> {
        self.world.check("grab_result.buffer")?;
        // Safety: the buffer stays registered while its result is alive.
        let all = unsafe { self.completed.buffer.as_slice() };
        Ok(&all[..self.completed.payload_size])
    }

    fn payload_type(&self) -> SdkResult<NativePayloadType> {
        self.world.check("grab_result.payload_type")?;
        Ok(self.frame().payload_type)
    }

    fn status(&self) -> SdkResult<NativeGrabStatus> {
        self.world.check("grab_result.status")?;
        Ok(self.frame().status)
    }

    fn error_code(&self) -> SdkResult<u32> {
        self.world.check("grab_result.error_code")?;
        Ok(self.frame().error_code)
    }

    fn error_description(&self) -> SdkResult<String> {
        self.world.check("grab_result.error_description")?;
        Ok(self.frame().error_description.clone())
    }

    fn grab_succeeded(&self) -> SdkResult<bool> {
        self.world.check("grab_result.grab_succeeded")?;
        Ok(self.frame().status == STATUS_GRABBED)
    }

    fn payload_size(&self) -> SdkResult<usize> {
        self.world.check("grab_result.payload_size")?;
        Ok(self.completed.payload_size)
    }

    fn buffer_size(&self) -> SdkResult<usize> {
        self.world.check("grab_result.buffer_size")?;
        Ok(self.completed.buffer.len())
    }

    fn size_x(&self) -> SdkResult<i32> {
        self.world.check("grab_result.size_x")?;
        Ok(self.frame().width as i32)
    }

    fn size_y(&self) -> SdkResult<i32> {
        self.world.check("grab_result.size_y")?;
        Ok(self.frame().height as i32)
    }

    fn offset_x(&self) -> SdkResult<u32> {
        self.world.check("grab_result.offset_x")?;
        Ok(self.frame().offset_x)
    }

    fn offset_y(&self) -> SdkResult<u32> {
        self.world.check("grab_result.offset_y")?;
        Ok(self.frame().offset_y)
    }

    fn padding_x(&self) -> SdkResult<u32> {
        self.world.check("grab_result.padding_x")?;
        Ok(self.frame().padding_x)
    }

    fn padding_y(&self) -> SdkResult<u32> {
        self.world.check("grab_result.padding_y")?;
        Ok(self.frame().padding_y)
    }

    fn time_stamp(&self) -> SdkResult<u64> {
        self.world.check("grab_result.time_stamp")?;
        Ok(self.frame().time_stamp)
    }

    fn block_id(&self) -> SdkResult<u64> {
        self.world.check("grab_result.block_id")?;
        Ok(self.frame().block_id.unwrap_or(u64::MAX))
    }

    fn image(&self) -> SdkResult<Box<dyn ImageRef>> {
        self.world.check("grab_result.image")?;
        let frame = self.frame();
        let valid = frame.status == STATUS_GRABBED
            && frame.payload_type == PAYLOAD_IMAGE
            && frame.width > 0
            && frame.height > 0
            && self.completed.payload_size > 0;
        Ok(Box::new(FakeImage {
            valid,
            pixel_type: frame.pixel_type,
            width: frame.width,
            height: frame.height,
            size: self.completed.payload_size,
            ptr: self.completed.buffer.as_ptr(),
            _token: self.world.track(),
        }))
    }

    fn buffer_id(&self) -> SdkResult<StreamBufferId> {
        self.world.check("grab_result.buffer_id")?;
        Ok(self.completed.id)
    }
}

/// Image view of a [`FakeGrabResult`].
pub struct FakeImage {
    valid: bool,
    pixel_type: NativePixelType,
    width: u32,
    height: u32,
    size: usize,
    ptr: *const u8,
    _token: AllocationToken,
}

// The pointer targets caller memory registered with the grabber.
unsafe impl Send for FakeImage {}

impl ImageRef for FakeImage {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pixel_type(&self) -> NativePixelType {
        if self.valid {
            self.pixel_type
        } else {
            PIXEL_UNDEFINED
        }
    }

    fn width(&self) -> u32 {
        if self.valid {
            self.width
        } else {
            0
        }
    }

    fn height(&self) -> u32 {
        if self.valid {
            self.height
        } else {
            0
        }
    }

    fn image_size(&self) -> usize {
        if self.valid {
            self.size
        } else {
            0
        }
    }

    fn stride(&self) -> Option<usize> {
        if !self.valid {
            return None;
        }
        let bits = ((self.pixel_type.0 >> 16) & 0xff) as usize;
        let line_bits = self.width as usize * bits;
        (bits > 0 && line_bits % 8 == 0).then_some(line_bits / 8)
    }

    fn buffer(&self) -> *const u8 {
        if self.valid {
            self.ptr
        } else {
            std::ptr::null()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn stream() -> (FakeStream, FakeStreamGrabber, Arc<World>) {
        let world = Arc::new(World::default());
        let registry = StreamRegistry::new(Vec::new(), world.clone());
        let state = registry.get("1", 0);
        let grabber = FakeStreamGrabber::new(state.clone(), world.track());
        (FakeStream::new(state), grabber, world)
    }

    fn register(grabber: &mut FakeStreamGrabber, memory: &mut [u8]) -> StreamBufferId {
        let buffer = unsafe { RegisteredBuffer::new(memory.as_mut_ptr(), memory.len()) };
        grabber.register_buffer(buffer).unwrap()
    }

    #[test]
    fn queue_requires_prepare() {
        let (_, mut grabber, _) = stream();
        grabber.open().unwrap();
        assert!(grabber.queue_buffer(StreamBufferId(1)).is_err());
        let mut memory = vec![0u8; 16];
        let err = grabber
            .register_buffer(unsafe { RegisteredBuffer::new(memory.as_mut_ptr(), 16) })
            .unwrap_err();
        assert!(matches!(err, SdkError::Known { .. }));
    }

    #[test]
    fn emitted_frame_lands_in_queued_buffer() {
        let (stream, mut grabber, _) = stream();
        grabber.open().unwrap();
        grabber.prepare_grab().unwrap();
        let mut memory = vec![0u8; 4 * 3];
        let id = register(&mut grabber, &mut memory);
        grabber.queue_buffer(id).unwrap();
        assert!(grabber.queue_buffer(id).is_err());

        assert_eq!(stream.emit_frame(FakeFrame::mono8(4, 3, 9)), Some(id));
        assert!(stream.emit_frame(FakeFrame::mono8(4, 3, 9)).is_none());

        let wait = grabber.wait_object().unwrap();
        assert_eq!(
            wait.wait(Duration::from_millis(10)).unwrap(),
            WaitOutcome::Signaled
        );
        let result = grabber.retrieve_result().unwrap().unwrap();
        assert!(result.grab_succeeded().unwrap());
        assert_eq!(result.buffer_size().unwrap(), 12);
        assert_eq!(result.buffer().unwrap(), &[9u8; 12][..]);
        assert_eq!(result.block_id().unwrap(), 1);
        assert_eq!(result.buffer_id().unwrap(), id);

        let image = result.image().unwrap();
        assert!(image.is_valid());
        assert_eq!(image.stride(), Some(4));
        assert_eq!(image.image_size(), 12);
        drop(image);
        drop(result);
        assert!(grabber.retrieve_result().unwrap().is_none());
        assert_eq!(memory, vec![9u8; 12]);
    }

    #[test]
    fn failed_frame_has_invalid_image() {
        let (stream, mut grabber, _) = stream();
        grabber.open().unwrap();
        grabber.prepare_grab().unwrap();
        let mut memory = vec![0u8; 8];
        let id = register(&mut grabber, &mut memory);
        grabber.queue_buffer(id).unwrap();
        stream.emit_frame(FakeFrame::failed(0xE100_0014, "frame incomplete"));

        let result = grabber.retrieve_result().unwrap().unwrap();
        assert_eq!(result.status().unwrap(), STATUS_FAILED);
        assert!(!result.grab_succeeded().unwrap());
        assert_eq!(result.buffer_size().unwrap(), 8);
        assert_eq!(result.payload_size().unwrap(), 0);
        let image = result.image().unwrap();
        assert!(!image.is_valid());
        assert_eq!(image.width(), 0);
        assert!(image.buffer().is_null());
        assert_eq!(image.stride(), None);
    }

    #[test]
    fn cancel_wakes_waiter_and_flushes_queue() {
        let (stream, mut grabber, _) = stream();
        grabber.open().unwrap();
        grabber.prepare_grab().unwrap();
        let mut memory = vec![0u8; 8];
        let id = register(&mut grabber, &mut memory);
        grabber.queue_buffer(id).unwrap();

        let wait = grabber.wait_object().unwrap();
        let waiter = thread::spawn(move || wait.wait(Duration::from_secs(5)).unwrap());
        thread::sleep(Duration::from_millis(20));
        grabber.cancel_grab().unwrap();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Canceled);

        assert_eq!(stream.queued_count(), 0);
        let result = grabber.retrieve_result().unwrap().unwrap();
        assert_eq!(result.status().unwrap(), STATUS_CANCELED);
        assert_eq!(result.payload_size().unwrap(), 0);
    }

    #[test]
    fn wait_times_out_without_signal() {
        let wait = FakeWaitObject::new();
        let start = Instant::now();
        assert_eq!(
            wait.wait(Duration::from_millis(30)).unwrap(),
            WaitOutcome::TimedOut
        );
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn dropping_the_grabber_releases_the_channel() {
        let (stream, mut grabber, world) = stream();
        grabber.open().unwrap();
        grabber.prepare_grab().unwrap();
        let mut memory = vec![0u8; 8];
        let id = register(&mut grabber, &mut memory);
        grabber.queue_buffer(id).unwrap();
        assert_eq!(stream.queued_count(), 1);

        drop(grabber);
        assert!(!stream.is_open());
        assert_eq!(stream.queued_count(), 0);
        assert_eq!(stream.emit_frame(FakeFrame::mono8(2, 2, 1)), None);

        let mut reopened = FakeStreamGrabber::new(stream.state.clone(), world.track());
        reopened.open().unwrap();
    }

    #[test]
    fn results_are_tracked_until_dropped() {
        let (stream, mut grabber, world) = stream();
        grabber.open().unwrap();
        grabber.prepare_grab().unwrap();
        let mut memory = vec![0u8; 4];
        let id = register(&mut grabber, &mut memory);
        grabber.queue_buffer(id).unwrap();
        stream.emit_frame(FakeFrame::mono8(2, 2, 1));

        assert_eq!(world.live(), 1);
        let result = grabber.retrieve_result().unwrap().unwrap();
        assert_eq!(world.live(), 2);
        drop(result);
        drop(grabber);
        assert_eq!(world.live(), 0);
    }
}
