//! Store CLI commands
//!
//! Inspect the entity store and load snapshot-format fixtures into it.

use std::path::PathBuf;

use clap::Subcommand;

use crate::audit::ActivityLog;
use crate::backup::{ConflictStrategy, LocalArtifactStore, RestoreManager, RestoreOptions, Snapshot};
use crate::config::settings::Settings;
use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;

use super::lock::RestoreLock;

/// Store subcommands
#[derive(Subcommand)]
pub enum StoreCommands {
    /// Show record counts per collection
    Stats,

    /// Load a snapshot document into the store, overwriting existing records
    Import {
        /// Path to a snapshot JSON file
        file: PathBuf,
    },
}

/// Handle a store command
pub fn handle_store_command(
    storage: &Storage,
    settings: &Settings,
    cmd: StoreCommands,
) -> StoreResult<()> {
    match cmd {
        StoreCommands::Stats => {
            let stats = storage.stats()?;
            println!("Store Statistics");
            println!("================");
            println!("Categories: {}", stats.categories);
            println!("Products:   {}", stats.products);
            println!("Customers:  {}", stats.customers);
            println!("Settings:   {}", stats.settings);
            println!("Orders:     {}", stats.orders);
            println!("Backups:    {}", storage.backups.count()?);
        }

        StoreCommands::Import { file } => {
            let bytes = std::fs::read(&file).map_err(|e| {
                StoreError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let snapshot = Snapshot::parse(&bytes)?;

            let options = RestoreOptions {
                conflict_strategy: ConflictStrategy::Overwrite,
                ..RestoreOptions::default()
            };

            let paths = storage.paths();
            let _lock = RestoreLock::acquire(paths)?;
            let artifacts = LocalArtifactStore::new(paths.artifact_dir());
            let activity = ActivityLog::new(paths.activity_log());
            let restore =
                RestoreManager::new(storage, &artifacts, &activity, settings.restore_timeout());
            let report = restore.restore_snapshot(&snapshot, &options)?;

            println!("Imported {}", file.display());
            println!("{}", report.summary());
            for error in report.errors() {
                println!("  {}", error);
            }
        }
    }

    Ok(())
}
