pub mod camera_source;
pub mod ffmpeg_source;
pub mod image_source;
