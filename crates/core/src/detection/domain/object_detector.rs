use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for per-frame object detection.
///
/// Implementations may be stateful (warmed-up sessions, frame skipping),
/// hence `&mut self`.
pub trait ObjectDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
