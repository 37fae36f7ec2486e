use crate::shared::frame::Frame;
use crate::shared::source::Source;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Treats a still image as a one-frame stream: a single read yields the
/// decoded picture, the next read reports end of stream.
pub struct ImageSource {
    frame: Option<Frame>,
    opened: bool,
}

impl ImageSource {
    pub fn new() -> Self {
        Self {
            frame: None,
            opened: false,
        }
    }
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for ImageSource {
    fn open(&mut self, source: &Source) -> Result<StreamInfo, Box<dyn std::error::Error>> {
        let Source::File(path) = source else {
            return Err("ImageSource requires a file source".into());
        };

        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();

        self.frame = Some(Frame::new(img.into_raw(), width, height, 0));
        self.opened = true;

        Ok(StreamInfo {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            codec: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("image")
                .to_lowercase(),
        })
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if !self.opened {
            return Err("ImageSource: not opened".into());
        }
        Ok(self.frame.take())
    }

    fn close(&mut self) {
        self.frame = None;
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn create_test_image(path: &Path, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, _| {
            image::Rgb([(x % 256) as u8, 64, 192])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_open_returns_single_frame_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");
        create_test_image(&path, 64, 48);

        let mut source = ImageSource::new();
        let info = source.open(&Source::File(path)).unwrap();
        assert_eq!(info.width, 64);
        assert_eq!(info.height, 48);
        assert_eq!(info.total_frames, 1);
        assert_eq!(info.codec, "png");
    }

    #[test]
    fn test_read_yields_one_frame_then_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");
        create_test_image(&path, 64, 48);

        let mut source = ImageSource::new();
        source.open(&Source::File(path)).unwrap();

        let frame = source.read_frame().unwrap().unwrap();
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.index(), 0);
        assert_eq!(frame.data().len(), 64 * 48 * 3);

        assert!(source.read_frame().unwrap().is_none());
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let mut source = ImageSource::new();
        let result = source.open(&Source::File(PathBuf::from("/nonexistent/img.png")));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_device_source_fails() {
        let mut source = ImageSource::new();
        assert!(source.open(&Source::Device(0)).is_err());
    }

    #[test]
    fn test_read_without_open_fails() {
        let mut source = ImageSource::new();
        assert!(source.read_frame().is_err());
    }

    #[test]
    fn test_close_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");
        create_test_image(&path, 8, 8);

        let mut source = ImageSource::new();
        source.open(&Source::File(path)).unwrap();
        source.close();
        assert!(source.read_frame().is_err());
    }
}
