use std::path::Path;

/// Extensions eligible for sidecar pairing and metadata updates.
const UPDATABLE_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

/// Everything treated as an image when tidying a folder, including formats
/// the update pipeline does not touch.
const IMAGE_EXTENSIONS: [&str; 10] = [
    "png", "jpg", "jpeg", "bmp", "gif", "tiff", "heic", "heif", "dng", "raw",
];

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// True for files the update pipeline will pair with sidecars.
pub fn is_updatable_image(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| UPDATABLE_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_image_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_media_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| {
            IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updatable_extensions_case_insensitive() {
        assert!(is_updatable_image(Path::new("/photos/IMG_0001.JPG")));
        assert!(is_updatable_image(Path::new("/photos/img.heic")));
        assert!(!is_updatable_image(Path::new("/photos/clip.mp4")));
        assert!(!is_updatable_image(Path::new("/photos/raw.dng")));
        assert!(!is_updatable_image(Path::new("/photos/noext")));
    }

    #[test]
    fn test_media_file_covers_images_and_videos() {
        assert!(is_media_file(Path::new("a.gif")));
        assert!(is_media_file(Path::new("b.MOV")));
        assert!(!is_media_file(Path::new("c.json")));
        assert!(!is_media_file(Path::new("archive_browser.html")));
    }

    #[test]
    fn test_image_file_excludes_videos() {
        assert!(is_image_file(Path::new("a.tiff")));
        assert!(!is_image_file(Path::new("b.webm")));
    }
}
