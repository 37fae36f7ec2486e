use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clap::Parser;

use framesight_core::annotate::domain::frame_annotator::FrameAnnotator;
use framesight_core::annotate::infrastructure::box_annotator::BoxAnnotator;
use framesight_core::detection::domain::object_detector::ObjectDetector;
use framesight_core::detection::infrastructure::coco_labels;
use framesight_core::detection::infrastructure::model_resolver;
use framesight_core::detection::infrastructure::onnx_detector::{OnnxDetector, DEFAULT_CONFIDENCE};
use framesight_core::pipeline::cancel::CancelToken;
use framesight_core::pipeline::capture_session::{CaptureSession, FrameSink, SessionOutcome};
use framesight_core::shared::constants::{DETECT_MODEL_NAME, DETECT_MODEL_URL};
use framesight_core::shared::source::{is_image_file, Source};
use framesight_core::video::domain::frame_source::FrameSource;
use framesight_core::video::infrastructure::camera_source::CameraSource;
use framesight_core::video::infrastructure::ffmpeg_source::FfmpegSource;
use framesight_core::video::infrastructure::image_source::ImageSource;

/// Live object detection for videos, images and cameras.
#[derive(Parser)]
#[command(name = "framesight")]
struct Cli {
    /// Video file, image file, or camera index (e.g. "0").
    input: Option<String>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Use a local ONNX model file instead of the cached default.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Stop after this many frames (useful for live cameras).
    #[arg(long)]
    max_frames: Option<usize>,

    /// Draw box outlines only, without class labels.
    #[arg(long)]
    no_labels: bool,

    /// Write the annotated frame here (image inputs only).
    #[arg(long)]
    output: Option<PathBuf>,

    /// List available cameras and exit.
    #[arg(long)]
    list_cameras: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list_cameras {
        return list_cameras();
    }

    let Some(input) = cli.input.as_deref() else {
        return Err("No input given (file path or camera index)".into());
    };
    let source: Source = input.parse()?;
    validate(&cli, &source)?;

    let detector = build_detector(&cli)?;
    let annotator: Box<dyn FrameAnnotator> = Box::new(BoxAnnotator::new(!cli.no_labels));

    if let Source::File(ref path) = source {
        if is_image_file(path) {
            return run_image(&source, detector, annotator, cli.output.as_deref());
        }
    }
    run_stream(&source, detector, annotator, cli.max_frames)
}

fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let devices = CameraSource::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found");
        return Ok(());
    }
    for (index, name) in devices.iter().enumerate() {
        println!("{index}: {name}");
    }
    Ok(())
}

fn run_image(
    source: &Source,
    detector: Box<dyn ObjectDetector>,
    annotator: Box<dyn FrameAnnotator>,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let counts = Arc::new(Mutex::new(HashMap::new()));
    let counts_sink = counts.clone();
    let output_path = output.map(|p| p.to_path_buf());

    let sink: FrameSink = Box::new(move |frame, detections| {
        tally(&counts_sink, detections);
        if let Some(ref path) = output_path {
            let img =
                image::RgbImage::from_raw(frame.width(), frame.height(), frame.into_data());
            match img {
                Some(img) => match img.save(path) {
                    Ok(()) => log::info!("Output written to {}", path.display()),
                    Err(e) => log::error!("Failed to write {}: {e}", path.display()),
                },
                None => log::error!("Frame buffer did not match its dimensions"),
            }
        }
        true
    });

    let mut session = CaptureSession::new(Box::new(ImageSource::new()), detector, annotator, sink);
    session.run(source, &CancelToken::new())?;

    let counts = counts.lock().map_err(|_| "summary lock poisoned")?;
    print_summary(&counts);
    Ok(())
}

fn run_stream(
    source: &Source,
    detector: Box<dyn ObjectDetector>,
    annotator: Box<dyn FrameAnnotator>,
    max_frames: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_source: Box<dyn FrameSource> = if source.is_device() {
        Box::new(CameraSource::new())
    } else {
        Box::new(FfmpegSource::new())
    };

    let counts = Arc::new(Mutex::new(HashMap::new()));
    let counts_sink = counts.clone();
    let rendered = Arc::new(AtomicUsize::new(0));
    let rendered_sink = rendered.clone();

    let sink: FrameSink = Box::new(move |frame, detections| {
        tally(&counts_sink, detections);
        let n = rendered_sink.fetch_add(1, Ordering::Relaxed) + 1;
        eprint!("\rFrame {}: {} objects   ", frame.index() + 1, detections.len());
        match max_frames {
            Some(limit) => n < limit,
            None => true,
        }
    });

    let mut session = CaptureSession::new(frame_source, detector, annotator, sink);
    let report = session.run(source, &CancelToken::new())?;
    eprintln!();

    match report.outcome {
        SessionOutcome::Ended => log::info!("Stream ended after {} frames", report.frames_read),
        SessionOutcome::Stopped => log::info!("Stopped after {} frames", report.frames_read),
    }
    let counts = counts.lock().map_err(|_| "summary lock poisoned")?;
    print_summary(&counts);
    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn ObjectDetector>, Box<dyn std::error::Error>> {
    let model_path = match cli.model {
        Some(ref path) => path.clone(),
        None => {
            log::info!("Resolving model: {DETECT_MODEL_NAME}");
            let path = model_resolver::resolve(
                DETECT_MODEL_NAME,
                DETECT_MODEL_URL,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };
    Ok(Box::new(OnnxDetector::new(&model_path, cli.confidence)?))
}

fn validate(cli: &Cli, source: &Source) -> Result<(), Box<dyn std::error::Error>> {
    if let Source::File(path) = source {
        if !path.exists() {
            return Err(format!("Input file not found: {}", path.display()).into());
        }
        if cli.output.is_some() && !is_image_file(path) {
            return Err("--output only applies to image inputs".into());
        }
    } else if cli.output.is_some() {
        return Err("--output only applies to image inputs".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if let Some(ref model) = cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn tally(
    counts: &Arc<Mutex<HashMap<usize, usize>>>,
    detections: &[framesight_core::detection::domain::detection::Detection],
) {
    if let Ok(mut counts) = counts.lock() {
        for detection in detections {
            *counts.entry(detection.class_id).or_insert(0) += 1;
        }
    }
}

fn print_summary(counts: &HashMap<usize, usize>) {
    if counts.is_empty() {
        println!("No objects detected");
        return;
    }
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    println!("Detections by class:");
    for (class_id, count) in rows {
        println!("  {:<14} {count}", coco_labels::label(*class_id));
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading detection model... {pct}%");
    } else {
        eprint!("\rDownloading detection model... {downloaded} bytes");
    }
}
