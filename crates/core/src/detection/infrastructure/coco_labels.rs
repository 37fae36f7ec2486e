/// The 80 COCO class names, in model output order.
pub const COCO_LABELS: &[&str] = &[
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Class name for a model class id. Total: out-of-range ids map to
/// `"object"` rather than failing, so a model with extra classes still
/// renders something sensible.
pub fn label(class_id: usize) -> &'static str {
    COCO_LABELS.get(class_id).copied().unwrap_or("object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eighty_classes() {
        assert_eq!(COCO_LABELS.len(), 80);
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(label(0), "person");
        assert_eq!(label(2), "car");
        assert_eq!(label(79), "toothbrush");
    }

    #[test]
    fn test_out_of_range_is_object() {
        assert_eq!(label(80), "object");
        assert_eq!(label(usize::MAX), "object");
    }
}
