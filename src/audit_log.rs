use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only audit trail of every update attempt, for human inspection.
/// Lines follow the `timestamp - LEVEL - message` shape; each entry is
/// written in one call under the mutex so concurrent workers never
/// interleave within an entry.
pub struct AuditLog {
    file: Mutex<File>,
}

impl AuditLog {
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(AuditLog {
            file: Mutex::new(file),
        })
    }

    pub fn info(&self, message: &str) {
        self.append("INFO", message);
    }

    pub fn warning(&self, message: &str) {
        self.append("WARNING", message);
    }

    pub fn error(&self, message: &str) {
        self.append("ERROR", message);
    }

    fn append(&self, level: &str, message: &str) {
        let entry = format!(
            "{} - {} - {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );
        // A poisoned lock or failed write loses one audit line, not the batch.
        if let Ok(mut file) = self.file.lock() {
            if let Err(e) = file.write_all(entry.as_bytes()) {
                log::error!("Failed to append audit log entry: {}", e);
            }
        }
    }
}
