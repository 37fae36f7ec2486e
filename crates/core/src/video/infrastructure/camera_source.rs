use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::shared::frame::Frame;
use crate::shared::source::Source;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Captures frames from a webcam via nokhwa.
///
/// Reads block at the device frame rate, which is what paces the capture
/// loop for live sources. A camera has no end of stream: `read_frame` never
/// returns `Ok(None)`, a dead device surfaces as an error.
pub struct CameraSource {
    camera: Option<Camera>,
    next_index: usize,
}

// Safety: CameraSource is only used from a single thread at a time.
// The backend handle inside nokhwa's Camera is not shared across threads.
unsafe impl Send for CameraSource {}

impl CameraSource {
    pub fn new() -> Self {
        Self {
            camera: None,
            next_index: 0,
        }
    }

    /// Names of the cameras the backend can see, in index order.
    pub fn list_devices() -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
        Ok(cameras
            .iter()
            .map(|info| format!("{}: {}", info.index(), info.human_name()))
            .collect())
    }
}

impl Default for CameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self, source: &Source) -> Result<StreamInfo, Box<dyn std::error::Error>> {
        let Source::Device(index) = source else {
            return Err("CameraSource requires a device source".into());
        };

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(*index), requested)?;
        camera.open_stream()?;

        let format = camera.camera_format();
        let info = StreamInfo {
            width: format.width(),
            height: format.height(),
            fps: format.frame_rate() as f64,
            total_frames: 0, // live
            codec: format.format().to_string(),
        };

        self.camera = Some(camera);
        self.next_index = 0;
        Ok(info)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(camera) = self.camera.as_mut() else {
            return Err("CameraSource: not opened".into());
        };

        let buffer = camera.frame()?;
        let decoded = buffer.decode_image::<RgbFormat>()?;
        let (width, height) = decoded.dimensions();

        let frame = Frame::new(decoded.into_raw(), width, height, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            let _ = camera.stop_stream();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // Hardware-dependent paths (open a real device) are exercised manually;
    // these cover the contract around them.

    #[test]
    fn test_open_file_source_fails() {
        let mut source = CameraSource::new();
        let result = source.open(&Source::File(PathBuf::from("clip.mp4")));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_without_open_fails() {
        let mut source = CameraSource::new();
        assert!(source.read_frame().is_err());
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut source = CameraSource::new();
        source.close();
        source.close();
    }
}
