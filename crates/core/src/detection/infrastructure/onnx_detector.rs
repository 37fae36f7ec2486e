/// COCO object detector using a YOLO model through ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference, per-class argmax and NMS
/// post-processing. The model itself is an opaque pretrained artifact.
use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::shared::frame::Frame;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for detections.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Box coordinates occupy the first four output features; the rest are
/// per-class scores.
const BOX_FEATURES: usize = 4;

pub struct OnnxDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NCHW). Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    // shape is [N, C, H, W] — use H (square input expected)
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl ObjectDetector for OnnxDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let fw = frame.width() as f64;
        let fh = frame.height() as f64;

        // 1. Preprocess: letterbox + normalize → NCHW float32
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("detection model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();

        // YOLO output shape is [1, num_features, num_detections] (transposed)
        // or [1, num_detections, num_features]. Handle both.
        let (num_dets, num_feats) = if shape.len() == 3 {
            if shape[1] < shape[2] {
                (shape[2], shape[1])
            } else {
                (shape[1], shape[2])
            }
        } else {
            return Err(format!("Unexpected model output shape: {shape:?}").into());
        };

        if num_feats <= BOX_FEATURES {
            return Err(format!("Model output has no class scores: {shape:?}").into());
        }

        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let transposed = shape[1] < shape[2];

        // 3. Parse candidates
        let mut candidates = Vec::new();
        for i in 0..num_dets {
            let row = if transposed {
                // Read column i from transposed layout
                (0..num_feats)
                    .map(|f| data[f * num_dets + i])
                    .collect::<Vec<f32>>()
            } else {
                data[i * num_feats..(i + 1) * num_feats].to_vec()
            };

            // row format: [cx, cy, w, h, class0_score, class1_score, ...]
            let Some((class_id, score)) = class_argmax(&row[BOX_FEATURES..]) else {
                continue;
            };
            if score < self.confidence {
                continue;
            }

            let cx = row[0] as f64;
            let cy = row[1] as f64;
            let w = row[2] as f64;
            let h = row[3] as f64;

            // Convert from letterbox coords back to original frame coords,
            // clamped to the frame.
            let x1 = (((cx - w / 2.0) - pad_x as f64) / scale).clamp(0.0, fw);
            let y1 = (((cy - h / 2.0) - pad_y as f64) / scale).clamp(0.0, fh);
            let x2 = (((cx + w / 2.0) - pad_x as f64) / scale).clamp(0.0, fw);
            let y2 = (((cy + h / 2.0) - pad_y as f64) / scale).clamp(0.0, fh);

            candidates.push(Detection {
                x: x1.round() as i32,
                y: y1.round() as i32,
                width: (x2 - x1).round() as i32,
                height: (y2 - y1).round() as i32,
                class_id,
                score,
            });
        }

        // 4. NMS
        Ok(nms(&mut candidates, NMS_IOU_THRESH))
    }
}

/// Index and value of the best class score. `None` for an empty slice.
fn class_argmax(scores: &[f32]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, s)| (i, s as f64))
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Build padded image (filled with 114/255 gray, YOLO convention)
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize + copy into padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

/// Greedy class-aware NMS: sort by score descending, suppress boxes of the
/// same class that overlap a kept box.
fn nms(dets: &mut [Detection], iou_thresh: f64) -> Vec<Detection> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if suppressed[j] || dets[j].class_id != dets[i].class_id {
                continue;
            }
            if dets[i].iou(&dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: i32, y: i32, w: i32, h: i32, class_id: usize, score: f64) -> Detection {
        Detection {
            x,
            y,
            width: w,
            height: h,
            class_id,
            score,
        }
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 frame → letterbox to 640x640
        // Scale = min(640/200, 640/100) = 3.2
        // new_w = 640, new_h = 320, pad_x = 0, pad_y = 160
        let data = vec![128u8; 200 * 100 * 3];
        let frame = Frame::new(data, 200, 100, 0);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((scale - 3.2).abs() < 0.01);
        assert_eq!(pad_x, 0);
        assert_eq!(pad_y, 160);
    }

    #[test]
    fn test_letterbox_square_frame() {
        let data = vec![128u8; 100 * 100 * 3];
        let frame = Frame::new(data, 100, 100, 0);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((scale - 6.4).abs() < 0.01);
        assert_eq!(pad_x, 0);
        assert_eq!(pad_y, 0);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        // Use a wide frame so there's vertical padding
        let data = vec![255u8; 100 * 50 * 3];
        let frame = Frame::new(data, 100, 50, 0);
        let (tensor, _, pad_x, pad_y) = letterbox(&frame, 640);

        assert_eq!(pad_x, 0);
        assert!(pad_y > 0);

        // A pixel inside the image region is ~1.0
        let y = pad_y as usize + 1;
        let x = pad_x as usize + 1;
        assert!((tensor[[0, 0, y, x]] - 1.0).abs() < 0.01);

        // A pad pixel (top-left, outside image region) is ~114/255
        let pad_val = 114.0 / 255.0;
        assert!((tensor[[0, 0, 0, 0]] - pad_val).abs() < 0.01);
    }

    #[test]
    fn test_class_argmax_picks_best() {
        let scores = [0.1f32, 0.7, 0.3];
        assert_eq!(class_argmax(&scores), Some((1, 0.7f32 as f64)));
    }

    #[test]
    fn test_class_argmax_first_wins_ties() {
        let scores = [0.5f32, 0.5];
        let (idx, _) = class_argmax(&scores).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_class_argmax_empty() {
        assert_eq!(class_argmax(&[]), None);
    }

    #[test]
    fn test_nms_suppresses_overlapping_same_class() {
        let mut dets = vec![
            detection(0, 0, 100, 100, 0, 0.9),
            detection(5, 5, 100, 100, 0, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_keeps_overlapping_different_classes() {
        // A dog box and a person box can legitimately overlap
        let mut dets = vec![
            detection(0, 0, 100, 100, 0, 0.9),
            detection(5, 5, 100, 100, 16, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let mut dets = vec![
            detection(0, 0, 50, 50, 0, 0.9),
            detection(200, 200, 50, 50, 0, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<Detection> = Vec::new();
        let kept = nms(&mut dets, 0.3);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_nms_confidence_ordering() {
        let mut dets = vec![
            detection(0, 0, 100, 100, 0, 0.5),
            detection(2, 2, 100, 100, 0, 0.9),
        ];
        let kept = nms(&mut dets, 0.3);
        // Higher confidence (0.9) should win
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }
}
