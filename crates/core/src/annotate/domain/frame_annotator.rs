use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for drawing detections onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid
/// allocation, and must tolerate boxes that touch or cross frame edges.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, detections: &[Detection]);
}
