use std::marker::PhantomData;
use std::os::raw::c_char;
use std::time::Duration;

use log::{debug, trace};
use vision_boundary_camera::capi::stream::*;
use vision_boundary_camera::{GrabStatus, PayloadType, PixelType, StreamBufferId};
use vision_boundary_core::WaitOutcome;

use super::HasNodeMap;
use crate::camera::node::NodeMap;
use crate::error::{check, check_described, Result};
use crate::text::OwnedString;

const ERROR_CAPACITY: usize = 255;

/// A stream grabber together with the memory registered on it.
///
/// Registered buffers live as long as the grabber, so results can be read
/// without copying.
pub struct StreamGrabber {
    raw: *mut StreamGrabberHandle,
    buffers: Vec<Box<[u8]>>,
}

unsafe impl Send for StreamGrabber {}

impl StreamGrabber {
    pub(crate) fn from_raw(raw: *mut StreamGrabberHandle) -> Self {
        Self {
            raw,
            buffers: Vec::new(),
        }
    }

    pub fn open(&mut self) -> Result<()> {
        check(unsafe { vb_cam_stream_grabber_open(self.raw) })?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        check(unsafe { vb_cam_stream_grabber_close(self.raw) })?;
        Ok(())
    }

    pub fn prepare_grab(&mut self) -> Result<()> {
        check(unsafe { vb_cam_stream_grabber_prepare_grab(self.raw) })?;
        Ok(())
    }

    pub fn cancel_grab(&self) -> Result<()> {
        check(unsafe { vb_cam_stream_grabber_cancel_grab(self.raw) })?;
        Ok(())
    }

    pub fn finish_grab(&mut self) -> Result<()> {
        check(unsafe { vb_cam_stream_grabber_finish_grab(self.raw) })?;
        Ok(())
    }

    /// Allocate and register a buffer of `len` bytes.
    pub fn register_buffer(&mut self, len: usize) -> Result<StreamBufferId> {
        let mut buffer = vec![0u8; len].into_boxed_slice();
        let id = check(unsafe {
            vb_cam_stream_grabber_register_buffer(self.raw, buffer.as_mut_ptr(), buffer.len())
        })?;
        self.buffers.push(buffer);
        debug!("registered buffer {} ({len} bytes)", id.0);
        Ok(id)
    }

    pub fn queue_buffer(&self, id: StreamBufferId) -> Result<()> {
        let mut error = [0 as c_char; ERROR_CAPACITY];
        check_described(
            unsafe {
                vb_cam_stream_grabber_queue_buffer(self.raw, id, error.as_mut_ptr(), error.len())
            },
            &error,
        )?;
        Ok(())
    }

    pub fn wait_object(&self) -> Result<WaitObject> {
        Ok(WaitObject {
            raw: check(unsafe { vb_cam_stream_grabber_wait_object(self.raw) })?,
        })
    }

    /// Next completed result, or `None` when nothing is ready.
    pub fn retrieve_result(&self) -> Result<Option<GrabResult<'_>>> {
        let raw = check(unsafe { vb_cam_stream_grabber_retrieve_result(self.raw) })?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(GrabResult {
            raw,
            _buffers: PhantomData,
        }))
    }
}

impl HasNodeMap for StreamGrabber {
    fn node_map(&self) -> Result<NodeMap> {
        Ok(NodeMap::from_raw(check(unsafe {
            vb_cam_stream_grabber_node_map(self.raw)
        })?))
    }
}

impl Drop for StreamGrabber {
    fn drop(&mut self) {
        // The SDK must let go of `buffers` before they are freed.
        if !self.buffers.is_empty() {
            if let Err(err) = self.cancel_grab().and_then(|_| self.finish_grab()) {
                debug!("releasing grab buffers on drop: {err}");
            }
        }
        if let Err(err) = self.close() {
            debug!("closing stream grabber on drop: {err}");
        }
        let _ = unsafe { vb_cam_stream_grabber_delete(self.raw) };
    }
}

pub struct WaitObject {
    raw: *mut WaitObjectHandle,
}

unsafe impl Send for WaitObject {}

impl WaitObject {
    /// Block for at most `timeout`, rounded down to whole milliseconds.
    pub fn wait(&self, timeout: Duration) -> Result<WaitOutcome> {
        let ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let outcome = check(unsafe { vb_cam_wait_object_wait(self.raw, ms) })?;
        trace!("wait {ms} ms: {outcome:?}");
        Ok(outcome)
    }
}

impl Drop for WaitObject {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_wait_object_delete(self.raw) };
    }
}

/// One completed grab. Borrows the grabber whose buffer it refers to.
pub struct GrabResult<'g> {
    raw: *mut GrabResultHandle,
    _buffers: PhantomData<&'g [u8]>,
}

impl GrabResult<'_> {
    pub fn status(&self) -> Result<GrabStatus> {
        check(unsafe { vb_cam_grab_result_status(self.raw) })
    }

    pub fn payload_type(&self) -> Result<PayloadType> {
        check(unsafe { vb_cam_grab_result_payload_type(self.raw) })
    }

    /// The grabbed bytes, `payload_size` long.
    pub fn data(&self) -> Result<&[u8]> {
        let slice = check(unsafe { vb_cam_grab_result_buffer(self.raw) })?;
        // Safety: the bytes live in a buffer owned by the borrowed grabber.
        Ok(unsafe { slice.as_slice() })
    }

    pub fn error_code(&self) -> Result<u32> {
        check(unsafe { vb_cam_grab_result_error_code(self.raw) })
    }

    pub fn error_description(&self) -> Result<String> {
        let mut text = OwnedString::new()?;
        check(unsafe { vb_cam_grab_result_error_description(self.raw, text.as_mut_ptr()) })?;
        text.contents()
    }

    pub fn payload_size(&self) -> Result<usize> {
        check(unsafe { vb_cam_grab_result_payload_size(self.raw) })
    }

    pub fn size_x(&self) -> Result<i32> {
        check(unsafe { vb_cam_grab_result_size_x(self.raw) })
    }

    pub fn size_y(&self) -> Result<i32> {
        check(unsafe { vb_cam_grab_result_size_y(self.raw) })
    }

    pub fn time_stamp(&self) -> Result<u64> {
        check(unsafe { vb_cam_grab_result_time_stamp(self.raw) })
    }

    pub fn block_id(&self) -> Result<u64> {
        check(unsafe { vb_cam_grab_result_block_id(self.raw) })
    }

    /// True only for a completely grabbed frame.
    pub fn grab_succeeded(&self) -> Result<bool> {
        check(unsafe { vb_cam_grab_result_grab_succeeded(self.raw) })
    }

    /// Size of the registered buffer, which may exceed `payload_size`.
    pub fn buffer_size(&self) -> Result<usize> {
        check(unsafe { vb_cam_grab_result_buffer_size(self.raw) })
    }

    /// Region-of-interest offset as `(x, y)`.
    pub fn offset(&self) -> Result<(u32, u32)> {
        Ok((
            check(unsafe { vb_cam_grab_result_offset_x(self.raw) })?,
            check(unsafe { vb_cam_grab_result_offset_y(self.raw) })?,
        ))
    }

    /// Line and row padding as `(x, y)`.
    pub fn padding(&self) -> Result<(u32, u32)> {
        Ok((
            check(unsafe { vb_cam_grab_result_padding_x(self.raw) })?,
            check(unsafe { vb_cam_grab_result_padding_y(self.raw) })?,
        ))
    }

    /// Buffer to queue again once this result is no longer needed.
    pub fn buffer_id(&self) -> Result<StreamBufferId> {
        check(unsafe { vb_cam_grab_result_buffer_id(self.raw) })
    }

    pub fn image(&self) -> Result<ImageRef<'_>> {
        Ok(ImageRef {
            raw: check(unsafe { vb_cam_grab_result_image(self.raw) })?,
            _result: PhantomData,
        })
    }
}

impl Drop for GrabResult<'_> {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_grab_result_delete(self.raw) };
    }
}

/// Image view of a grab result.
pub struct ImageRef<'r> {
    raw: *mut ImageRefHandle,
    _result: PhantomData<&'r GrabResult<'r>>,
}

impl ImageRef<'_> {
    pub fn is_valid(&self) -> Result<bool> {
        check(unsafe { vb_cam_image_is_valid(self.raw) })
    }

    pub fn pixel_type(&self) -> Result<PixelType> {
        check(unsafe { vb_cam_image_pixel_type(self.raw) })
    }

    pub fn width(&self) -> Result<u32> {
        check(unsafe { vb_cam_image_width(self.raw) })
    }

    pub fn height(&self) -> Result<u32> {
        check(unsafe { vb_cam_image_height(self.raw) })
    }

    pub fn image_size(&self) -> Result<usize> {
        check(unsafe { vb_cam_image_size(self.raw) })
    }

    pub fn stride(&self) -> Result<usize> {
        check(unsafe { vb_cam_image_stride(self.raw) })
    }

    pub fn data(&self) -> Result<&[u8]> {
        let slice = check(unsafe { vb_cam_image_buffer(self.raw) })?;
        // Safety: the bytes belong to the result this view borrows.
        Ok(unsafe { slice.as_slice() })
    }

    /// Copy a `Mono8` image into an owned grayscale image. Other pixel
    /// types give `None`.
    #[cfg(feature = "image")]
    pub fn to_gray_image(&self) -> Result<Option<image::GrayImage>> {
        if self.pixel_type()? != PixelType::Mono8 {
            return Ok(None);
        }
        let (width, height) = (self.width()?, self.height()?);
        let stride = self.stride()?;
        let data = self.data()?;
        let row = width as usize;
        let mut pixels = Vec::with_capacity(row * height as usize);
        for line in data.chunks(stride).take(height as usize) {
            pixels.extend_from_slice(&line[..row.min(line.len())]);
        }
        Ok(image::GrayImage::from_raw(width, height, pixels))
    }
}

impl Drop for ImageRef<'_> {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_image_delete(self.raw) };
    }
}
