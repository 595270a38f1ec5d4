//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup engine.

pub mod backup;
pub mod lock;
pub mod store;

pub use backup::{handle_backup_command, BackupCommands, InclusionArgs};
pub use lock::RestoreLock;
pub use store::{handle_store_command, StoreCommands};
