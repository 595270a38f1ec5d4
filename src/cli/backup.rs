//! Backup CLI commands
//!
//! Implements CLI commands for creating, inspecting, pruning and restoring
//! backups.

use clap::{Args, Subcommand};

use crate::audit::ActivityLog;
use crate::backup::{BackupManager, ConflictStrategy, LocalArtifactStore, RestoreManager, RestoreOptions};
use crate::config::settings::Settings;
use crate::display::{format_backup_details, format_backup_list};
use crate::error::{StoreError, StoreResult};
use crate::models::{BackupType, InclusionFlags};
use crate::storage::Storage;

use super::lock::RestoreLock;

/// Activity entries shown by `backup list --verbose`
const RECENT_ACTIVITY: usize = 5;

/// Which collections to export or restore
#[derive(Args, Debug, Clone, Copy)]
pub struct InclusionArgs {
    /// Leave out categories and products
    #[arg(long)]
    pub no_products: bool,

    /// Leave out customers
    #[arg(long)]
    pub no_customers: bool,

    /// Leave out store settings
    #[arg(long)]
    pub no_settings: bool,

    /// Include orders (archival only; orders are never restored)
    #[arg(long)]
    pub orders: bool,
}

impl InclusionArgs {
    pub fn to_flags(self) -> InclusionFlags {
        InclusionFlags {
            include_products: !self.no_products,
            include_orders: self.orders,
            include_customers: !self.no_customers,
            include_settings: !self.no_settings,
        }
    }
}

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Export a new backup
    Create {
        /// Mark the backup as scheduled (subject to retention)
        #[arg(long)]
        scheduled: bool,

        /// Who is creating the backup
        #[arg(long)]
        by: Option<String>,

        #[command(flatten)]
        inclusion: InclusionArgs,
    },

    /// List all backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup ID or short ID (bak-xxxxxxxx)
        backup: String,
    },

    /// Delete a backup and its artifact
    Delete {
        /// Backup ID or short ID
        backup: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,

        /// Who is deleting the backup
        #[arg(long)]
        by: Option<String>,
    },

    /// Delete old scheduled backups according to retention policy
    Prune {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Restore a completed backup into the store
    Restore {
        /// Backup ID or short ID
        backup: String,

        /// Compute what would change without writing anything
        #[arg(long)]
        preview: bool,

        /// What to do with records that already exist (skip or overwrite)
        #[arg(long)]
        strategy: Option<ConflictStrategy>,

        /// Who is running the restore
        #[arg(long)]
        by: Option<String>,

        #[command(flatten)]
        inclusion: InclusionArgs,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> StoreResult<()> {
    let paths = storage.paths();
    let artifacts = LocalArtifactStore::new(paths.artifact_dir());
    let activity = ActivityLog::new(paths.activity_log());
    let manager = BackupManager::new(
        storage,
        &artifacts,
        &activity,
        settings.backup_retention.clone(),
    );

    match cmd {
        BackupCommands::Create {
            scheduled,
            by,
            inclusion,
        } => {
            let backup_type = if scheduled {
                BackupType::Scheduled
            } else {
                BackupType::Manual
            };
            let actor = by.unwrap_or_else(|| settings.default_actor.clone());

            let record =
                manager.create_backup_with_retention(backup_type, inclusion.to_flags(), &actor)?;

            println!("Backup created: {}", record.id.short());
            println!("File:    {}", record.filename);
            println!("Records: {}", record.record_count);
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;
            println!("{}", format_backup_list(&backups, verbose));
            if backups.is_empty() {
                println!("Create one with: storevault backup create");
            } else if verbose {
                let recent = activity.read_recent(RECENT_ACTIVITY)?;
                if !recent.is_empty() {
                    println!();
                    println!("Recent activity:");
                    for entry in &recent {
                        println!("  {}", entry.format_human_readable());
                    }
                }
            }
        }

        BackupCommands::Info { backup } => {
            let record = manager.get_backup(&backup)?;
            print!("{}", format_backup_details(&record));

            let history: Vec<_> = activity
                .read_all()?
                .into_iter()
                .filter(|entry| entry.backup_id == record.id)
                .collect();
            if !history.is_empty() {
                println!();
                println!("Activity:");
                for entry in &history {
                    println!("  {}", entry.format_human_readable());
                }
            }
        }

        BackupCommands::Delete { backup, force, by } => {
            let record = manager.get_backup(&backup)?;

            if !force {
                print!("{}", format_backup_details(&record));
                println!();
                println!("To delete this backup, run again with --force flag:");
                println!("  storevault backup delete {} --force", record.id.short());
                return Ok(());
            }

            let actor = by.unwrap_or_else(|| settings.default_actor.clone());
            let deleted = manager.delete_backup(&record.id.to_string(), &actor)?;
            println!("Deleted backup {}", deleted.id.short());
        }

        BackupCommands::Prune { force } => {
            let keep = settings.backup_retention.scheduled_count;
            let candidates = manager.retention_candidates()?;

            if candidates.is_empty() {
                println!("No backups to prune.");
                println!("Current retention policy: keep {} scheduled backup(s)", keep);
                return Ok(());
            }

            println!("Retention policy: keep {} scheduled backup(s)", keep);
            println!("To be deleted: {}", candidates.len());
            for record in &candidates {
                println!("  {} {}", record.id.short(), record.filename);
            }
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  storevault backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }

        BackupCommands::Restore {
            backup,
            preview,
            strategy,
            by,
            inclusion,
        } => {
            let flags = inclusion.to_flags();
            let options = RestoreOptions {
                preview,
                conflict_strategy: strategy.unwrap_or(settings.default_conflict_strategy),
                include_products: flags.include_products,
                include_orders: flags.include_orders,
                include_customers: flags.include_customers,
                include_settings: flags.include_settings,
            };
            let actor = by.unwrap_or_else(|| settings.default_actor.clone());

            let _lock = RestoreLock::acquire(paths)?;
            let restore = RestoreManager::new(storage, &artifacts, &activity, settings.restore_timeout());
            let report = restore.restore(&backup, &options, &actor)?;

            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| StoreError::Json(format!("Failed to serialize report: {}", e)))?;
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusion_args_default_to_export_defaults() {
        let args = InclusionArgs {
            no_products: false,
            no_customers: false,
            no_settings: false,
            orders: false,
        };
        assert_eq!(args.to_flags(), InclusionFlags::default());
    }

    #[test]
    fn test_inclusion_args_negations() {
        let args = InclusionArgs {
            no_products: true,
            no_customers: false,
            no_settings: true,
            orders: true,
        };
        let flags = args.to_flags();
        assert!(!flags.include_products);
        assert!(flags.include_customers);
        assert!(!flags.include_settings);
        assert!(flags.include_orders);
    }
}
