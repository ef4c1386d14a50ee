use log::{error, info};
use rayon::prelude::*;
use similar::TextDiff;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::audit_log::AuditLog;
use crate::config::Config;
use crate::db::{self, StoreError};
use crate::db_pool::DbPool;
use crate::metadata_engine::{EngineError, MetadataEngine};
use crate::sidecar::{self, SchemaError};
use crate::tag_translator;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Failed to read metadata before update: {0}")]
    EngineRead(EngineError),
    #[error("Failed to write metadata: {0}")]
    EngineWrite(EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    SkippedNoMetadata,
    SkippedAlreadyApplied,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub applied: usize,
    pub skipped_no_metadata: usize,
    pub skipped_already_applied: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "applied {}, already applied {}, no metadata {}, failed {}",
            self.applied, self.skipped_already_applied, self.skipped_no_metadata, self.failed
        )
    }
}

/// Drives one batch: translate, check the idempotence store, call the
/// engine, audit, record. Pairs are independent; an error in one is caught
/// at the pair boundary and never stops the others.
pub struct UpdateProcessor {
    config: Config,
    db_pool: DbPool,
    engine: Arc<dyn MetadataEngine>,
    audit: Arc<AuditLog>,
}

impl UpdateProcessor {
    pub fn new(
        config: Config,
        db_pool: DbPool,
        engine: Arc<dyn MetadataEngine>,
        audit: Arc<AuditLog>,
    ) -> Self {
        UpdateProcessor {
            config,
            db_pool,
            engine,
            audit,
        }
    }

    pub fn run(
        &self,
        workers: &rayon::ThreadPool,
        pairs: &HashMap<PathBuf, PathBuf>,
    ) -> BatchSummary {
        let outcomes: Vec<Result<UpdateOutcome, UpdateError>> = workers.install(|| {
            pairs
                .par_iter()
                .map(|(image, sidecar_path)| {
                    let result = self.process_pair(image, sidecar_path);
                    if let Err(e) = &result {
                        error!("Failed to update {}: {}", image.display(), e);
                        self.audit
                            .error(&format!("Failed to update {}: {}", image.display(), e));
                    }
                    result
                })
                .collect()
        });

        let mut summary = BatchSummary::default();
        for outcome in outcomes {
            match outcome {
                Ok(UpdateOutcome::Applied) => summary.applied += 1,
                Ok(UpdateOutcome::SkippedNoMetadata) => summary.skipped_no_metadata += 1,
                Ok(UpdateOutcome::SkippedAlreadyApplied) => summary.skipped_already_applied += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    fn process_pair(
        &self,
        image: &Path,
        sidecar_path: &Path,
    ) -> Result<UpdateOutcome, UpdateError> {
        let Some(record) = sidecar::load(sidecar_path)? else {
            return Ok(UpdateOutcome::SkippedNoMetadata);
        };

        let tags = tag_translator::translate(&record, self.config.require_image_views)?;
        let hash = tag_translator::payload_hash(&tags);

        let filename = image.to_string_lossy();
        if db::was_applied(&self.db_pool, &filename, &hash)? {
            info!("Skipped (already updated): {}", image.display());
            self.audit
                .info(&format!("Skipped (already updated): {}", image.display()));
            return Ok(UpdateOutcome::SkippedAlreadyApplied);
        }

        // If the before-state is unreadable we abort without writing.
        let before = self.engine.read_all(image).map_err(UpdateError::EngineRead)?;
        self.engine
            .write_fields(image, &tags)
            .map_err(UpdateError::EngineWrite)?;
        let after = self.engine.read_all(image).map_err(UpdateError::EngineRead)?;

        let before_str = tag_translator::canonical_json(&before);
        let after_str = tag_translator::canonical_json(&after);
        let diff = TextDiff::from_lines(&before_str, &after_str)
            .unified_diff()
            .header("before.json", "after.json")
            .to_string();

        // One entry per update attempt, so concurrent workers cannot split
        // a record across interleaved appends.
        self.audit.info(&format!(
            "Updated: {}\n=== Metadata Before ===\n{}\n=== Metadata Diff ===\n{}\n=== Metadata After ===\n{}",
            image.display(),
            before_str,
            diff,
            after_str
        ));

        db::record_applied(&self.db_pool, &filename, &hash)?;
        Ok(UpdateOutcome::Applied)
    }
}
