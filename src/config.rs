use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub media_root: PathBuf,
    pub db_path: String,
    pub audit_log_path: PathBuf,
    pub workers: usize,
    /// When set, a sidecar without `imageViews` fails translation instead of
    /// omitting the tag.
    pub require_image_views: bool,
}

impl Config {
    pub fn from_env(media_root: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            media_root,
            db_path: env::var("TAKEOUT_SYNC_DB_PATH")
                .unwrap_or_else(|_| "./data/takeout.db".to_string()),
            audit_log_path: env::var("TAKEOUT_SYNC_LOG_PATH")
                .unwrap_or_else(|_| "./logs/metadata_changes.log".to_string())
                .into(),
            workers: env::var("TAKEOUT_SYNC_WORKERS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            require_image_views: env::var("TAKEOUT_SYNC_REQUIRE_IMAGE_VIEWS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
