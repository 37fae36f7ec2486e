use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extensions offered by the desktop file dialog and accepted as video
/// input by the CLI.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "m4v", "mpg", "mpeg"];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Tagged origin of frames: a file on disk or a capture device index.
///
/// "No source selected" is deliberately not a variant — controllers hold an
/// `Option<Source>`, so device 0 and "nothing chosen" can never be confused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Device(u32),
}

impl Source {
    pub fn is_device(&self) -> bool {
        matches!(self, Source::Device(_))
    }

    /// Short human-readable description for status lines and logs.
    pub fn describe(&self) -> String {
        match self {
            Source::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Source::Device(index) => format!("camera {index}"),
        }
    }
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    /// An all-digit argument is a device index; anything else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u32>() {
            Ok(index) => Ok(Source::Device(index)),
            Err(_) => Ok(Source::File(PathBuf::from(s))),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Device(index) => write!(f, "device:{index}"),
        }
    }
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_video_file(path: &Path) -> bool {
    has_extension_in(path, VIDEO_EXTENSIONS)
}

pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_digits_is_device() {
        let source: Source = "0".parse().unwrap();
        assert_eq!(source, Source::Device(0));
        let source: Source = "2".parse().unwrap();
        assert_eq!(source, Source::Device(2));
    }

    #[test]
    fn test_parse_path_is_file() {
        let source: Source = "/videos/clip.mp4".parse().unwrap();
        assert_eq!(source, Source::File(PathBuf::from("/videos/clip.mp4")));
    }

    #[test]
    fn test_parse_numeric_filename_with_extension_is_file() {
        // "10.mp4" fails u32 parsing, so it stays a path
        let source: Source = "10.mp4".parse().unwrap();
        assert!(matches!(source, Source::File(_)));
    }

    #[test]
    fn test_describe_device() {
        assert_eq!(Source::Device(0).describe(), "camera 0");
    }

    #[test]
    fn test_describe_file_uses_file_name() {
        let source = Source::File(PathBuf::from("/videos/clip.mp4"));
        assert_eq!(source.describe(), "clip.mp4");
    }

    #[test]
    fn test_display() {
        assert_eq!(Source::Device(1).to_string(), "device:1");
        assert_eq!(
            Source::File(PathBuf::from("a/b.mkv")).to_string(),
            "a/b.mkv"
        );
    }

    #[rstest]
    #[case::lowercase("clip.mp4", true)]
    #[case::uppercase("CLIP.MP4", true)]
    #[case::mkv("clip.mkv", true)]
    #[case::image("photo.jpg", false)]
    #[case::no_extension("clip", false)]
    fn test_is_video_file(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_video_file(Path::new(name)), expected);
    }

    #[rstest]
    #[case::jpeg("photo.jpeg", true)]
    #[case::png("photo.png", true)]
    #[case::video("clip.mp4", false)]
    fn test_is_image_file(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image_file(Path::new(name)), expected);
    }

    #[test]
    fn test_device_overwrites_prior_file_selection() {
        // Selection is overwrite-not-merge: a fresh Device value carries no
        // trace of any earlier File value.
        let mut selected = Some(Source::File(PathBuf::from("old.mp4")));
        selected = Some(Source::Device(0));
        assert_eq!(selected, Some(Source::Device(0)));
    }
}
