/// Metadata reported by a frame source after a successful open.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// 0 when unknown — live cameras, and containers without a frame count.
    pub total_frames: usize,
    /// Codec name for files, backend format for cameras.
    pub codec: String,
}

impl StreamInfo {
    pub fn is_live(&self) -> bool {
        self.total_frames == 0
    }
}
