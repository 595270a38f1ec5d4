//! Backup export and restore engine for Storevault
//!
//! # Architecture
//!
//! - `SnapshotBuilder`: reads the included collections into a versioned
//!   snapshot document
//! - `BackupManager`: runs the export pipeline and owns the `BackupRecord`
//!   lifecycle and retention
//! - `plan`: pure decision function shared by preview and real restores
//! - `RestoreExecutor`: applies decisions in dependency order inside one
//!   transactional unit, isolating per-record failures
//! - `RestoreManager`: resolves a backup, verifies its artifact and drives
//!   the executor
//!
//! # Snapshot Format
//!
//! Artifacts are JSON documents with the following structure:
//! - `version`: format version (`1.0`)
//! - `createdAt`: when the snapshot was taken
//! - `data`: `categories`, `products`, `customers`, `settings` and, for
//!   archival only, `orders`
//!
//! # Example
//!
//! ```rust,ignore
//! use storevault::backup::{BackupManager, LocalArtifactStore, RestoreManager, RestoreOptions};
//!
//! let artifacts = LocalArtifactStore::new(paths.artifact_dir());
//! let activity = ActivityLog::new(paths.activity_log());
//!
//! let manager = BackupManager::new(&storage, &artifacts, &activity, settings.backup_retention.clone());
//! let record = manager.create_backup(BackupType::Manual, InclusionFlags::default(), "admin")?;
//!
//! let restore = RestoreManager::new(&storage, &artifacts, &activity, settings.restore_timeout());
//! let report = restore.restore(&record.id.short(), &RestoreOptions::default(), "admin")?;
//! println!("{}", report.summary());
//! ```

pub mod artifact;
pub mod builder;
pub mod executor;
pub mod manager;
pub mod planner;
pub mod report;
pub mod restore;
pub mod snapshot;

pub use artifact::{sha256_hex, ArtifactStore, LocalArtifactStore};
pub use builder::SnapshotBuilder;
pub use executor::{apply_isolated, RestoreExecutor};
pub use manager::BackupManager;
pub use planner::{plan, ConflictStrategy, Decision};
pub use report::{RestorePhase, RestoreReport, RestoreResults, Tally};
pub use restore::{RestoreManager, RestoreOptions, RestoreRequest};
pub use snapshot::{CategoryRef, ProductRecord, Snapshot, SnapshotData, SNAPSHOT_VERSION};
