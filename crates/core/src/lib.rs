//! Live object detection core: frame sources, an ONNX detection backend,
//! CPU annotation, and the cancellable capture session that ties them
//! together. GUI and CLI frontends live in sibling crates.

pub mod annotate;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
