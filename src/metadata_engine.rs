use serde_json::Value;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

use crate::tag_translator::MetadataPayload;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to run exiftool: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("exiftool failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },
    #[error("Failed to parse exiftool output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("exiftool returned no metadata for {0}")]
    NoMetadata(String),
}

/// The embedded-metadata engine, treated as a black box: it can report a
/// file's current metadata as one JSON object and write a set of tag/value
/// pairs. Each call is atomic; there is no partial-field state.
pub trait MetadataEngine: Send + Sync {
    fn read_all(&self, path: &Path) -> Result<Value, EngineError>;
    fn write_fields(&self, path: &Path, fields: &MetadataPayload) -> Result<(), EngineError>;
}

/// Production engine shelling out to the `exiftool` binary.
pub struct ExifToolEngine {
    binary: String,
}

impl ExifToolEngine {
    pub fn new() -> Self {
        ExifToolEngine {
            binary: "exiftool".to_string(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<Vec<u8>, EngineError> {
        let output = Command::new(&self.binary).args(&args).output()?;
        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for ExifToolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataEngine for ExifToolEngine {
    fn read_all(&self, path: &Path) -> Result<Value, EngineError> {
        let stdout = self.run(vec![OsString::from("-json"), path.into()])?;
        let mut entries: Vec<Value> = serde_json::from_slice(&stdout)?;
        if entries.is_empty() {
            return Err(EngineError::NoMetadata(path.display().to_string()));
        }
        Ok(entries.remove(0))
    }

    fn write_fields(&self, path: &Path, fields: &MetadataPayload) -> Result<(), EngineError> {
        self.run(write_args(path, fields))?;
        Ok(())
    }
}

/// Builds `-TAG=VALUE` arguments for one write invocation. JSON strings are
/// passed raw, everything else in its JSON rendering.
fn write_args(path: &Path, fields: &MetadataPayload) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![OsString::from("-overwrite_original")];
    for (tag, value) in fields {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        args.push(OsString::from(format!("-{}={}", tag, rendered)));
    }
    args.push(path.into());
    args
}
