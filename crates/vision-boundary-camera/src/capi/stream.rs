//! Stream grabbers, grab results, image views and wait objects.

use std::os::raw::c_char;
use std::sync::Arc;

use vision_boundary_core::{
    handle, timeout_from_millis, translate, translate_described, translate_unit, BorrowedSlice,
    BoundaryEnum, BoundaryString, Done, Fault, TaggedResult, WaitOutcome, DONE,
};

use super::node::NodeMapHandle;
use crate::sdk::{GrabResult, ImageRef, RegisteredBuffer, StreamBufferId, StreamGrabber, WaitObject};
use crate::types::{GrabStatus, PayloadType, PixelType};

pub struct StreamGrabberHandle(Box<dyn StreamGrabber>);

impl StreamGrabberHandle {
    pub fn new(grabber: Box<dyn StreamGrabber>) -> Self {
        Self(grabber)
    }
}

pub struct GrabResultHandle(Box<dyn GrabResult>);

pub struct ImageRefHandle(Box<dyn ImageRef>);

pub struct WaitObjectHandle(Arc<dyn WaitObject>);

impl WaitObjectHandle {
    pub fn new(wait: Arc<dyn WaitObject>) -> Self {
        Self(wait)
    }
}

macro_rules! grabber_op {
    ($(#[$meta:meta])* $name:ident => $method:ident) => {
        $(#[$meta])*
        ///
        /// # Safety
        /// `grabber` must be null or a live stream grabber handle.
        #[no_mangle]
        pub unsafe extern "C" fn $name(grabber: *mut StreamGrabberHandle) -> TaggedResult<Done> {
            translate_unit(|| Ok(handle::borrow_mut(grabber)?.0.$method()?))
        }
    };
}

grabber_op!(vb_cam_stream_grabber_open => open);
grabber_op!(vb_cam_stream_grabber_close => close);
grabber_op!(
    /// Allocate grab resources. Buffers can be registered afterwards.
    vb_cam_stream_grabber_prepare_grab => prepare_grab
);
grabber_op!(
    /// Flush queued buffers to the result queue as canceled and wake waiters.
    vb_cam_stream_grabber_cancel_grab => cancel_grab
);
grabber_op!(
    /// Release grab resources. Registrations end here.
    vb_cam_stream_grabber_finish_grab => finish_grab
);

/// # Safety
/// `grabber` must be null or a live stream grabber handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_node_map(
    grabber: *const StreamGrabberHandle,
) -> TaggedResult<*mut NodeMapHandle> {
    translate(|| {
        let map = handle::borrow(grabber)?.0.node_map()?;
        Ok(handle::into_handle(NodeMapHandle::new(map)))
    })
}

/// Register `len` bytes at `buffer` for grabbing.
///
/// # Safety
/// `grabber` must be null or live. `buffer` must stay valid and untouched
/// by the caller until the grab is finished.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_register_buffer(
    grabber: *mut StreamGrabberHandle,
    buffer: *mut u8,
    len: usize,
) -> TaggedResult<StreamBufferId> {
    translate(|| {
        let grabber = handle::borrow_mut(grabber)?;
        if buffer.is_null() {
            return Err(Fault::NullArgument);
        }
        Ok(grabber.0.register_buffer(RegisteredBuffer::new(buffer, len))?)
    })
}

/// Queue a registered buffer. On a known SDK exception its description is
/// copied into `error`.
///
/// # Safety
/// `grabber` must be null or live; `error` null or valid for `capacity`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_queue_buffer(
    grabber: *mut StreamGrabberHandle,
    buffer: StreamBufferId,
    error: *mut c_char,
    capacity: usize,
) -> TaggedResult<Done> {
    translate_described(error, capacity, || {
        handle::borrow_mut(grabber)?.0.queue_buffer(buffer)?;
        Ok(DONE)
    })
}

/// # Safety
/// `grabber` must be null or a live stream grabber handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_wait_object(
    grabber: *const StreamGrabberHandle,
) -> TaggedResult<*mut WaitObjectHandle> {
    translate(|| {
        let wait = handle::borrow(grabber)?.0.wait_object()?;
        Ok(handle::into_handle(WaitObjectHandle(wait)))
    })
}

/// Take the oldest completed grab. A null payload on success means no
/// result is ready yet.
///
/// # Safety
/// `grabber` must be null or a live stream grabber handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_retrieve_result(
    grabber: *mut StreamGrabberHandle,
) -> TaggedResult<*mut GrabResultHandle> {
    translate(|| {
        let result = handle::borrow_mut(grabber)?.0.retrieve_result()?;
        Ok(result.map_or(std::ptr::null_mut(), |r| {
            handle::into_handle(GrabResultHandle(r))
        }))
    })
}

/// # Safety
/// `grabber` must be null or a live stream grabber handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_stream_grabber_delete(
    grabber: *mut StreamGrabberHandle,
) -> TaggedResult<Done> {
    translate_unit(|| handle::release(grabber))
}

// Grab results

/// Payload bytes, borrowed from the registered buffer. Valid while the
/// result handle is alive.
///
/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_buffer(
    result: *const GrabResultHandle,
) -> TaggedResult<BorrowedSlice<u8>> {
    translate(|| Ok(BorrowedSlice::from_slice(handle::borrow(result)?.0.buffer()?)))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_payload_type(
    result: *const GrabResultHandle,
) -> TaggedResult<PayloadType> {
    translate(|| PayloadType::from_native(handle::borrow(result)?.0.payload_type()?))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_status(
    result: *const GrabResultHandle,
) -> TaggedResult<GrabStatus> {
    translate(|| GrabStatus::from_native(handle::borrow(result)?.0.status()?))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_error_code(result: *const GrabResultHandle) -> TaggedResult<u32> {
    translate(|| Ok(handle::borrow(result)?.0.error_code()?))
}

/// Replace the contents of `out` with the result's error description.
///
/// # Safety
/// `result` must be null or live; `out` null or a live string from
/// `vb_string_new`.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_error_description(
    result: *const GrabResultHandle,
    out: *mut BoundaryString,
) -> TaggedResult<Done> {
    translate_unit(|| {
        let result = handle::borrow(result)?;
        let out = handle::borrow_mut(out)?;
        out.set(&result.0.error_description()?);
        Ok(())
    })
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_payload_size(
    result: *const GrabResultHandle,
) -> TaggedResult<usize> {
    translate(|| Ok(handle::borrow(result)?.0.payload_size()?))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_size_x(result: *const GrabResultHandle) -> TaggedResult<i32> {
    translate(|| Ok(handle::borrow(result)?.0.size_x()?))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_size_y(result: *const GrabResultHandle) -> TaggedResult<i32> {
    translate(|| Ok(handle::borrow(result)?.0.size_y()?))
}

macro_rules! grab_result_getter {
    ($(#[$meta:meta])* $name:ident => $method:ident: $ty:ty) => {
        $(#[$meta])*
        ///
        /// # Safety
        /// `result` must be null or a live grab result handle.
        #[no_mangle]
        pub unsafe extern "C" fn $name(result: *const GrabResultHandle) -> TaggedResult<$ty> {
            translate(|| Ok(handle::borrow(result)?.0.$method()?))
        }
    };
}

grab_result_getter!(
    /// True when the grab completed with image data.
    vb_cam_grab_result_grab_succeeded => grab_succeeded: bool
);
grab_result_getter!(
    /// Size of the registered buffer the result refers to.
    vb_cam_grab_result_buffer_size => buffer_size: usize
);
grab_result_getter!(vb_cam_grab_result_offset_x => offset_x: u32);
grab_result_getter!(vb_cam_grab_result_offset_y => offset_y: u32);
grab_result_getter!(
    /// Padding bytes at the end of each line.
    vb_cam_grab_result_padding_x => padding_x: u32
);
grab_result_getter!(
    /// Padding bytes after the last line.
    vb_cam_grab_result_padding_y => padding_y: u32
);

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_time_stamp(result: *const GrabResultHandle) -> TaggedResult<u64> {
    translate(|| Ok(handle::borrow(result)?.0.time_stamp()?))
}

/// Block id of the frame. A transport without block ids reports
/// `InvalidResult`.
///
/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_block_id(result: *const GrabResultHandle) -> TaggedResult<u64> {
    translate(|| match handle::borrow(result)?.0.block_id()? {
        u64::MAX => Err(Fault::InvalidResult("grab result block id")),
        id => Ok(id),
    })
}

/// Image view of the result. The view must not outlive the result.
///
/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_image(
    result: *const GrabResultHandle,
) -> TaggedResult<*mut ImageRefHandle> {
    translate(|| {
        let image = handle::borrow(result)?.0.image()?;
        Ok(handle::into_handle(ImageRefHandle(image)))
    })
}

/// Id of the buffer the result was grabbed into, ready to be queued again.
///
/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_buffer_id(
    result: *const GrabResultHandle,
) -> TaggedResult<StreamBufferId> {
    translate(|| Ok(handle::borrow(result)?.0.buffer_id()?))
}

/// # Safety
/// `result` must be null or a live grab result handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_grab_result_delete(result: *mut GrabResultHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(result))
}

// Image views. The SDK never raises here; sentinel values are reported as
// invalid results instead.

fn nonzero<T: PartialEq + Default>(value: T, what: &'static str) -> Result<T, Fault> {
    if value == T::default() {
        Err(Fault::InvalidResult(what))
    } else {
        Ok(value)
    }
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_is_valid(image: *const ImageRefHandle) -> TaggedResult<bool> {
    translate(|| Ok(handle::borrow(image)?.0.is_valid()))
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_pixel_type(image: *const ImageRefHandle) -> TaggedResult<PixelType> {
    translate(|| PixelType::from_native(handle::borrow(image)?.0.pixel_type()))
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_width(image: *const ImageRefHandle) -> TaggedResult<u32> {
    translate(|| nonzero(handle::borrow(image)?.0.width(), "image width"))
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_height(image: *const ImageRefHandle) -> TaggedResult<u32> {
    translate(|| nonzero(handle::borrow(image)?.0.height(), "image height"))
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_size(image: *const ImageRefHandle) -> TaggedResult<usize> {
    translate(|| nonzero(handle::borrow(image)?.0.image_size(), "image size"))
}

/// Bytes per line. Packed formats without a whole-byte line report
/// `InvalidResult`.
///
/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_stride(image: *const ImageRefHandle) -> TaggedResult<usize> {
    translate(|| {
        handle::borrow(image)?
            .0
            .stride()
            .ok_or(Fault::InvalidResult("image stride"))
    })
}

/// Pixel bytes, `image_size` long. An invalid image has no buffer and
/// reports `NullArgument`.
///
/// # Safety
/// `image` must be null or a live image handle whose grab result is alive.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_buffer(image: *const ImageRefHandle) -> TaggedResult<BorrowedSlice<u8>> {
    translate(|| {
        let image = &handle::borrow(image)?.0;
        let ptr = image.buffer();
        if ptr.is_null() {
            return Err(Fault::NullArgument);
        }
        Ok(BorrowedSlice {
            ptr,
            len: image.image_size(),
        })
    })
}

/// # Safety
/// `image` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_image_delete(image: *mut ImageRefHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(image))
}

// Wait objects

/// Block for at most `timeout_ms` milliseconds.
///
/// # Safety
/// `wait` must be null or a live wait object handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_wait_object_wait(
    wait: *const WaitObjectHandle,
    timeout_ms: u32,
) -> TaggedResult<WaitOutcome> {
    translate(|| Ok(handle::borrow(wait)?.0.wait(timeout_from_millis(timeout_ms))?))
}

/// # Safety
/// `wait` must be null or a live wait object handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_wait_object_delete(wait: *mut WaitObjectHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(wait))
}
