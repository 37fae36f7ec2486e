use crate::annotate::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::pipeline::cancel::CancelToken;
use crate::shared::frame::Frame;
use crate::shared::source::Source;
use crate::shared::stream_info::StreamInfo;

use crate::video::domain::frame_source::FrameSource;

/// How a capture run finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The source ran out of frames.
    Ended,
    /// Cancellation was requested (token or frame sink) and observed.
    Stopped,
}

/// Counters for a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub frames_read: usize,
    pub frames_rendered: usize,
    pub detections: usize,
}

/// Called once per annotated frame with the frame and its detections.
/// Returning `false` requests a stop, same as cancelling the token.
pub type FrameSink = Box<dyn FnMut(Frame, &[Detection]) -> bool + Send>;

/// The capture loop: read one frame, detect, annotate, deliver, repeat until
/// the token is cancelled, the sink declines, or the stream ends.
///
/// Owns its collaborators for the duration of a run; the stream handle never
/// leaves the worker thread the session runs on. No buffering or pacing: if
/// detection is slower than frame arrival, frames drop behind the blocking
/// read.
pub struct CaptureSession {
    source: Box<dyn FrameSource>,
    detector: Box<dyn ObjectDetector>,
    annotator: Box<dyn FrameAnnotator>,
    sink: FrameSink,
}

impl CaptureSession {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn ObjectDetector>,
        annotator: Box<dyn FrameAnnotator>,
        sink: FrameSink,
    ) -> Self {
        Self {
            source,
            detector,
            annotator,
            sink,
        }
    }

    /// Runs the session to completion.
    ///
    /// An open failure returns `Err` without a handle ever being held. After
    /// a successful open the source is closed exactly once on every exit
    /// path, including detector errors mid-run. All failures are terminal
    /// for the run — the caller re-selects and restarts, there are no
    /// retries.
    pub fn run(
        &mut self,
        origin: &Source,
        cancel: &CancelToken,
    ) -> Result<SessionReport, Box<dyn std::error::Error>> {
        let info = self.source.open(origin)?;
        log::info!(
            "capture started: {} ({}x{} @ {:.1} fps, {})",
            origin.describe(),
            info.width,
            info.height,
            info.fps,
            if info.is_live() {
                "live".to_string()
            } else {
                format!("{} frames", info.total_frames)
            }
        );

        let result = self.run_loop(cancel, &info);
        self.source.close();

        if let Ok(ref report) = result {
            log::info!(
                "capture finished: {:?} after {} frames, {} detections",
                report.outcome,
                report.frames_read,
                report.detections
            );
        }
        result
    }

    fn run_loop(
        &mut self,
        cancel: &CancelToken,
        info: &StreamInfo,
    ) -> Result<SessionReport, Box<dyn std::error::Error>> {
        let mut frames_read = 0;
        let mut frames_rendered = 0;
        let mut detections_total = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(SessionReport {
                    outcome: SessionOutcome::Stopped,
                    frames_read,
                    frames_rendered,
                    detections: detections_total,
                });
            }

            let Some(mut frame) = self.source.read_frame()? else {
                return Ok(SessionReport {
                    outcome: SessionOutcome::Ended,
                    frames_read,
                    frames_rendered,
                    detections: detections_total,
                });
            };
            frames_read += 1;

            let detections = self.detector.detect(&frame)?;
            detections_total += detections.len();

            self.annotator.annotate(&mut frame, &detections);
            frames_rendered += 1;

            if frame.index() % 100 == 0 && !info.is_live() {
                log::debug!(
                    "frame {}/{}: {} objects",
                    frame.index() + 1,
                    info.total_frames,
                    detections.len()
                );
            }

            if !(self.sink)(frame, &detections) {
                return Ok(SessionReport {
                    outcome: SessionOutcome::Stopped,
                    frames_read,
                    frames_rendered,
                    detections: detections_total,
                });
            }
        }
    }
}
