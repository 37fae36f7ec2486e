use crate::shared::frame::Frame;
use crate::shared::source::Source;
use crate::shared::stream_info::StreamInfo;

/// Produces frames from a video file, camera or still image.
///
/// Pull-based so the capture loop can interleave a cancellation check with
/// every read; live sources have no finite iterator to hand out.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, source: &Source) -> Result<StreamInfo, Box<dyn std::error::Error>>;

    /// Reads the next frame. `Ok(None)` means end of stream; `Err` is a
    /// decode or device failure, terminal for the run.
    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the underlying handle. Idempotent.
    fn close(&mut self);
}
