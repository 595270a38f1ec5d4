//! Backup manager for Storevault
//!
//! Owns the export pipeline and the lifecycle of every `BackupRecord`:
//! creation, listing, deletion and retention of scheduled backups.

use tracing::{info, warn};

use crate::audit::{record_activity, ActivityAction, ActivityEntry, ActivitySink};
use crate::config::settings::BackupRetention;
use crate::error::{StoreError, StoreResult};
use crate::models::{BackupRecord, BackupStatus, BackupType, InclusionFlags, StoredArtifact};
use crate::storage::Storage;

use super::artifact::{sha256_hex, ArtifactStore};
use super::builder::SnapshotBuilder;

/// Actor recorded for deletions made by the retention policy
const RETENTION_ACTOR: &str = "retention";

/// Manages backup creation and retention
pub struct BackupManager<'a> {
    storage: &'a Storage,
    artifacts: &'a dyn ArtifactStore,
    activity: &'a dyn ActivitySink,
    retention: BackupRetention,
}

impl<'a> BackupManager<'a> {
    /// Create a new BackupManager
    pub fn new(
        storage: &'a Storage,
        artifacts: &'a dyn ArtifactStore,
        activity: &'a dyn ActivitySink,
        retention: BackupRetention,
    ) -> Self {
        Self {
            storage,
            artifacts,
            activity,
            retention,
        }
    }

    /// Export a snapshot and record it
    ///
    /// The record is persisted as PENDING, then IN_PROGRESS, and finally
    /// COMPLETED. If building or storing the snapshot fails, the record is
    /// marked FAILED with the error message and the error is returned.
    pub fn create_backup(
        &self,
        backup_type: BackupType,
        inclusion: InclusionFlags,
        created_by: &str,
    ) -> StoreResult<BackupRecord> {
        let mut record = BackupRecord::new(backup_type, inclusion, created_by);
        self.persist(&record)?;

        record.start()?;
        self.persist(&record)?;
        info!(backup = %record.id.short(), backup_type = %backup_type, "backup started");

        let outcome = self.export(&record).and_then(|(artifact, record_count)| {
            let url = artifact.url.clone();
            let mut completed = record.clone();
            completed.complete(artifact, record_count)?;

            if let Err(e) = self.persist(&completed) {
                self.discard_artifact(&url);
                return Err(e);
            }
            Ok(completed)
        });

        match outcome {
            Ok(completed) => {
                info!(
                    backup = %completed.id.short(),
                    records = completed.record_count,
                    bytes = completed.file_size,
                    "backup completed"
                );
                record_activity(
                    self.activity,
                    ActivityEntry::new(created_by, ActivityAction::BackupCreated, completed.id)
                        .with_details(&completed.inclusion),
                );
                Ok(completed)
            }
            Err(e) => {
                warn!(backup = %record.id.short(), error = %e, "backup failed");
                record.fail(e.to_string())?;
                if let Err(persist_err) = self.persist(&record) {
                    warn!(backup = %record.id.short(), error = %persist_err, "failed to record backup failure");
                }
                record_activity(
                    self.activity,
                    ActivityEntry::new(created_by, ActivityAction::BackupFailed, record.id)
                        .with_details(&serde_json::json!({ "error": e.to_string() })),
                );
                Err(e)
            }
        }
    }

    /// Create a backup, then prune old scheduled backups if it was scheduled
    ///
    /// A retention failure is logged; it does not fail the backup.
    pub fn create_backup_with_retention(
        &self,
        backup_type: BackupType,
        inclusion: InclusionFlags,
        created_by: &str,
    ) -> StoreResult<BackupRecord> {
        let record = self.create_backup(backup_type, inclusion, created_by)?;

        if backup_type == BackupType::Scheduled {
            if let Err(e) = self.enforce_retention() {
                warn!(error = %e, "failed to enforce backup retention");
            }
        }

        Ok(record)
    }

    fn export(&self, record: &BackupRecord) -> StoreResult<(StoredArtifact, usize)> {
        let snapshot = SnapshotBuilder::new(self.storage).build(&record.inclusion)?;
        let bytes = snapshot.to_json_bytes()?;
        let checksum = sha256_hex(&bytes);
        let url = self.artifacts.put(&record.filename, &bytes)?;

        Ok((
            StoredArtifact {
                url,
                size_bytes: bytes.len() as u64,
                checksum,
            },
            snapshot.record_count(),
        ))
    }

    fn persist(&self, record: &BackupRecord) -> StoreResult<()> {
        self.storage.backups.upsert(record.clone())?;
        self.storage.backups.save()
    }

    fn discard_artifact(&self, url: &str) {
        if let Err(e) = self.artifacts.delete(url) {
            warn!(url, error = %e, "failed to remove artifact");
        }
    }

    /// List all backups, newest first
    pub fn list_backups(&self) -> StoreResult<Vec<BackupRecord>> {
        self.storage.backups.get_all()
    }

    /// Find a backup by full id or short prefix
    pub fn get_backup(&self, identifier: &str) -> StoreResult<BackupRecord> {
        self.storage
            .backups
            .find(identifier)?
            .ok_or_else(|| StoreError::backup_not_found(identifier))
    }

    /// Delete a backup's artifact and its record
    pub fn delete_backup(&self, identifier: &str, actor: &str) -> StoreResult<BackupRecord> {
        let record = self.get_backup(identifier)?;
        self.remove(&record)?;

        info!(backup = %record.id.short(), actor, "backup deleted");
        record_activity(
            self.activity,
            ActivityEntry::new(actor, ActivityAction::BackupDeleted, record.id),
        );
        Ok(record)
    }

    fn remove(&self, record: &BackupRecord) -> StoreResult<()> {
        if let Some(url) = &record.file_url {
            self.artifacts.delete(url)?;
        }
        self.storage.backups.delete(record.id)?;
        self.storage.backups.save()
    }

    /// Completed scheduled backups beyond the retention count, oldest last
    pub fn retention_candidates(&self) -> StoreResult<Vec<BackupRecord>> {
        let keep = self.retention.scheduled_count as usize;

        Ok(self
            .list_backups()?
            .into_iter()
            .filter(|b| b.backup_type == BackupType::Scheduled && b.status == BackupStatus::Completed)
            .skip(keep)
            .collect())
    }

    /// Delete scheduled backups beyond the retention count
    ///
    /// Manual backups and failed backups are never pruned. Returns the
    /// deleted records.
    pub fn enforce_retention(&self) -> StoreResult<Vec<BackupRecord>> {
        let candidates = self.retention_candidates()?;

        for record in &candidates {
            self.remove(record)?;
            record_activity(
                self.activity,
                ActivityEntry::new(RETENTION_ACTOR, ActivityAction::BackupDeleted, record.id),
            );
        }

        if !candidates.is_empty() {
            info!(deleted = candidates.len(), "retention enforced");
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ActivityLog;
    use crate::backup::artifact::LocalArtifactStore;
    use crate::config::paths::StorePaths;
    use crate::models::Category;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        storage: Storage,
        artifacts: LocalArtifactStore,
        activity: ActivityLog,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp.path().to_path_buf());
        let storage = Storage::open(paths.clone()).unwrap();
        let artifacts = LocalArtifactStore::new(paths.artifact_dir());
        let activity = ActivityLog::new(paths.activity_log());

        storage
            .transaction(Duration::from_secs(5), |tx| {
                tx.create(Category::new("C1", "Shoes"))?;
                Ok(())
            })
            .unwrap();

        Fixture {
            _temp: temp,
            storage,
            artifacts,
            activity,
        }
    }

    fn manager(f: &Fixture, keep: u32) -> BackupManager<'_> {
        BackupManager::new(
            &f.storage,
            &f.artifacts,
            &f.activity,
            BackupRetention {
                scheduled_count: keep,
            },
        )
    }

    #[test]
    fn test_create_backup_completes() {
        let f = fixture();
        let manager = manager(&f, 14);

        let record = manager
            .create_backup(BackupType::Manual, InclusionFlags::default(), "admin")
            .unwrap();

        assert_eq!(record.status, BackupStatus::Completed);
        assert_eq!(record.record_count, 1);
        assert!(record.file_size > 0);
        assert_eq!(record.checksum.as_ref().unwrap().len(), 64);

        let url = record.file_url.as_deref().unwrap();
        assert!(f.artifacts.exists(url).unwrap());

        let stored = manager.get_backup(&record.id.short()).unwrap();
        assert_eq!(stored.status, BackupStatus::Completed);

        let entries = f.activity.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::BackupCreated);
    }

    #[test]
    fn test_delete_backup_removes_artifact() {
        let f = fixture();
        let manager = manager(&f, 14);

        let record = manager
            .create_backup(BackupType::Manual, InclusionFlags::default(), "admin")
            .unwrap();
        let url = record.file_url.clone().unwrap();

        manager.delete_backup(&record.id.to_string(), "admin").unwrap();
        assert!(!f.artifacts.exists(&url).unwrap());
        assert!(manager.list_backups().unwrap().is_empty());
        assert!(manager.get_backup(&record.id.to_string()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_retention_keeps_manual_backups() {
        let f = fixture();
        let manager = manager(&f, 1);

        manager
            .create_backup(BackupType::Manual, InclusionFlags::default(), "admin")
            .unwrap();
        for _ in 0..3 {
            manager
                .create_backup_with_retention(BackupType::Scheduled, InclusionFlags::default(), "cron")
                .unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }

        let remaining = manager.list_backups().unwrap();
        let scheduled = remaining
            .iter()
            .filter(|b| b.backup_type == BackupType::Scheduled)
            .count();
        let manual = remaining
            .iter()
            .filter(|b| b.backup_type == BackupType::Manual)
            .count();

        assert_eq!(scheduled, 1);
        assert_eq!(manual, 1);
    }
}
