mod audit_log;
mod config;
mod db;
mod db_pool;
mod db_schema;
mod folder_organizer;
mod media_detector;
mod metadata_engine;
mod pair_resolver;
mod path_cleaner;
mod sidecar;
mod tag_translator;
mod update_processor;

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use config::Config;
use metadata_engine::ExifToolEngine;
use update_processor::UpdateProcessor;

#[derive(Parser)]
#[command(
    name = "takeout-sync",
    about = "Writes sidecar JSON metadata back into exported photos and tidies the export tree"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair media files with their sidecar JSON and write recovered metadata.
    Update { root: PathBuf },
    /// Move non-media files into per-folder metadata/ subdirectories.
    Organize { root: PathBuf },
    /// Move image files back out of metadata/ subdirectories.
    Restore { root: PathBuf },
    /// Strip non-ASCII characters from file and directory names.
    Sanitize { root: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Update { root } => run_update(root),
        Commands::Organize { root } => {
            folder_organizer::organize(&root)?;
            Ok(())
        }
        Commands::Restore { root } => {
            folder_organizer::restore(&root)?;
            Ok(())
        }
        Commands::Sanitize { root } => {
            path_cleaner::sanitize_tree(&root)?;
            Ok(())
        }
    }
}

fn run_update(root: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env(root)?;
    let db_pool = db_pool::create_db_pool(&config.db_path)?;
    let audit = Arc::new(audit_log::AuditLog::open(&config.audit_log_path)?);
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;

    info!(
        "Starting metadata scan and update for {}",
        config.media_root.display()
    );
    audit.info("Starting metadata scan and update...");

    let pairs = pair_resolver::resolve(&config.media_root, &workers, &audit);
    info!("Resolved {} media/sidecar pairs", pairs.len());

    let engine = Arc::new(ExifToolEngine::new());
    let processor = UpdateProcessor::new(config, db_pool, engine, audit.clone());
    let summary = processor.run(&workers, &pairs);

    info!("Batch finished: {}", summary);
    audit.info("Finish metadata scan and update.");
    Ok(())
}
