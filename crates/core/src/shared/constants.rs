pub const DETECT_MODEL_NAME: &str = "yolov8n.onnx";
pub const DETECT_MODEL_URL: &str =
    "https://github.com/framesight/framesight/releases/download/v0.1.0/yolov8n.onnx";

/// Device index used by the "use webcam" action.
pub const DEFAULT_CAMERA_INDEX: u32 = 0;
