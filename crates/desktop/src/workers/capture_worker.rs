use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use framesight_core::annotate::infrastructure::box_annotator::BoxAnnotator;
use framesight_core::detection::infrastructure::onnx_detector::OnnxDetector;
use framesight_core::pipeline::cancel::CancelToken;
use framesight_core::pipeline::capture_session::{CaptureSession, FrameSink, SessionReport};
use framesight_core::shared::frame::CHANNELS;
use framesight_core::shared::source::Source;
use framesight_core::video::domain::frame_source::FrameSource;
use framesight_core::video::infrastructure::camera_source::CameraSource;
use framesight_core::video::infrastructure::ffmpeg_source::FfmpegSource;

use super::model_cache::ModelCache;

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    DownloadProgress(u64, u64),
    Finished(SessionReport),
    Error(String),
    Cancelled,
}

/// One annotated frame ready for display, already converted to RGBA.
#[derive(Debug, Clone)]
pub struct ViewportFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Parameters for a capture run.
pub struct CaptureParams {
    pub source: Source,
    pub confidence: u32,
    pub draw_labels: bool,
    pub model_cache: Arc<ModelCache>,
}

/// Spawn a background capture worker. Returns the event receiver, the frame
/// receiver and the cancellation token.
///
/// The frame channel holds a single slot: the worker drops frames the UI has
/// not consumed yet, so a slow redraw never stalls capture.
pub fn spawn(
    params: CaptureParams,
) -> (Receiver<CaptureEvent>, Receiver<ViewportFrame>, CancelToken) {
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<CaptureEvent>();
    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<ViewportFrame>(1);
    let cancel = CancelToken::new();
    let cancel_clone = cancel.clone();

    thread::spawn(move || {
        if let Err(e) = run_capture(&event_tx, &frame_tx, &cancel_clone, params) {
            if cancel_clone.is_cancelled() {
                let _ = event_tx.send(CaptureEvent::Cancelled);
            } else {
                let _ = event_tx.send(CaptureEvent::Error(e.to_string()));
            }
        }
    });

    (event_rx, frame_rx, cancel)
}

fn run_capture(
    event_tx: &Sender<CaptureEvent>,
    frame_tx: &Sender<ViewportFrame>,
    cancel: &CancelToken,
    params: CaptureParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let confidence = params.confidence as f64 / 100.0;

    // Wait for the model (pre-loaded at startup or download in progress)
    let tx_dl = event_tx.clone();
    let model_path = params
        .model_cache
        .wait_for_model(
            &|dl, total| {
                let _ = tx_dl.send(CaptureEvent::DownloadProgress(dl, total));
            },
            cancel,
        )
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    if cancel.is_cancelled() {
        return Err("Cancelled".into());
    }

    let detector = Box::new(OnnxDetector::new(&model_path, confidence)?);
    let annotator = Box::new(BoxAnnotator::new(params.draw_labels));
    let frame_source: Box<dyn FrameSource> = if params.source.is_device() {
        Box::new(CameraSource::new())
    } else {
        Box::new(FfmpegSource::new())
    };

    let frame_tx_sink = frame_tx.clone();
    let cancel_sink = cancel.clone();
    let sink: FrameSink = Box::new(move |frame, _detections| {
        // try_send drops the frame when the UI still holds the previous one
        let _ = frame_tx_sink.try_send(ViewportFrame {
            width: frame.width(),
            height: frame.height(),
            rgba: rgb_to_rgba(frame.data()),
        });
        !cancel_sink.is_cancelled()
    });

    let mut session = CaptureSession::new(frame_source, detector, annotator, sink);
    let report = session.run(&params.source, cancel)?;

    let _ = event_tx.send(CaptureEvent::Finished(report));
    Ok(())
}

fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / CHANNELS * 4);
    for pixel in rgb.chunks_exact(CHANNELS) {
        rgba.extend_from_slice(pixel);
        rgba.push(255);
    }
    rgba
}
