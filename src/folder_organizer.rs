use log::{info, warn};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::media_detector;

const METADATA_DIR: &str = "metadata";

/// Moves every non-media file into a `metadata/` subdirectory of its
/// containing folder, so the export tree shows only photos and videos.
/// Already-segregated `metadata/` directories are left alone.
pub fn organize(root: &Path) -> Result<usize, io::Error> {
    let mut moved = 0;

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == METADATA_DIR))
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if media_detector::is_media_file(path) {
            continue;
        }
        let Some(parent) = path.parent() else {
            continue;
        };

        let metadata_dir = parent.join(METADATA_DIR);
        fs::create_dir_all(&metadata_dir)?;
        let target = metadata_dir.join(entry.file_name());
        info!("Moving {} -> {}", path.display(), target.display());
        fs::rename(path, &target)?;
        moved += 1;
    }

    info!("Moved {} non-media files under {}", moved, root.display());
    Ok(moved)
}

/// Reverses `organize` for image files: moves them out of `metadata/`
/// directories back into the parent folder. Existing targets are never
/// overwritten.
pub fn restore(root: &Path) -> Result<usize, io::Error> {
    let mut moved = 0;

    let metadata_dirs: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir() && e.file_name() == METADATA_DIR)
        .map(walkdir::DirEntry::into_path)
        .collect();

    for dir in metadata_dirs {
        let Some(parent) = dir.parent().map(Path::to_path_buf) else {
            continue;
        };
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !media_detector::is_image_file(&path) {
                continue;
            }
            let target = parent.join(entry.file_name());
            if target.exists() {
                warn!("Skipping existing file: {}", target.display());
                continue;
            }
            info!("Moving back: {} -> {}", path.display(), target.display());
            fs::rename(&path, &target)?;
            moved += 1;
        }
    }

    info!("Restored {} files under {}", moved, root.display());
    Ok(moved)
}
