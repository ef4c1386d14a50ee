use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::audit_log::AuditLog;
use crate::media_detector;

/// Walks `root` and pairs every updatable image with its sidecar JSON file.
/// Per-file lookups run on the worker pool; files without a candidate are
/// reported and left out of the map.
pub fn resolve(
    root: &Path,
    workers: &rayon::ThreadPool,
    audit: &AuditLog,
) -> HashMap<PathBuf, PathBuf> {
    let media: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| media_detector::is_updatable_image(path))
        .collect();

    info!("Found {} media files under {}", media.len(), root.display());

    workers.install(|| {
        media
            .par_iter()
            .filter_map(|image| match find_sidecar(image) {
                Some(sidecar) => Some((image.clone(), sidecar)),
                None => {
                    warn!("No metadata files for {}", image.display());
                    audit.warning(&format!("No metadata files for {}", image.display()));
                    None
                }
            })
            .collect()
    })
}

/// Picks the sidecar for one media file: `*.json` entries in the same
/// directory whose name starts with the full filename or its stem. An exact
/// `<filename>.json` wins; otherwise the lexicographically first candidate,
/// so the choice is stable across filesystems.
pub fn find_sidecar(image: &Path) -> Option<PathBuf> {
    let parent = image.parent()?;
    let file_name = image.file_name()?.to_str()?;
    let stem = image.file_stem()?.to_str()?;

    let mut candidates: Vec<PathBuf> = fs::read_dir(parent)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(file_name) || name.starts_with(stem))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }
    candidates.sort();

    let exact = format!("{file_name}.json");
    if let Some(hit) = candidates
        .iter()
        .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(exact.as_str()))
    {
        return Some(hit.clone());
    }

    if candidates.len() > 1 {
        info!(
            "{}: {} sidecar candidates, using {}",
            image.display(),
            candidates.len(),
            candidates[0].display()
        );
    }
    Some(candidates[0].clone())
}
