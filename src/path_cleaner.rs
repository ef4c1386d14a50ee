use deunicode::deunicode;
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

/// exiftool cannot address some non-ASCII paths, so names are transliterated
/// to ASCII and leftover punctuation is collapsed to underscores.
pub fn sanitize_name(name: &str) -> String {
    static FALLBACK: OnceLock<Regex> = OnceLock::new();
    let fallback = FALLBACK.get_or_init(|| Regex::new(r"[^\w. -]").expect("static pattern"));

    let transliterated = deunicode(name);
    fallback.replace_all(&transliterated, "_").into_owned()
}

/// Renames files and directories under `root` bottom-up so children are
/// handled before the directory containing them changes name. Collisions are
/// skipped with a warning.
pub fn sanitize_tree(root: &Path) -> Result<usize, io::Error> {
    let mut renamed = 0;

    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.path() == root {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let clean = sanitize_name(&name);
        if clean == name {
            continue;
        }

        let target = entry.path().with_file_name(&clean);
        if target.exists() {
            warn!("Skipping rename, target exists: {}", target.display());
            continue;
        }
        info!("Renamed: {} -> {}", entry.path().display(), target.display());
        fs::rename(entry.path(), &target)?;
        renamed += 1;
    }

    info!("Renamed {} entries under {}", renamed, root.display());
    Ok(renamed)
}
