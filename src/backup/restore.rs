//! Restore orchestration
//!
//! Resolves a backup record, fetches and verifies its artifact, validates the
//! snapshot and hands it to the executor. Every failure before the executor
//! runs is fatal and reported as a single error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::audit::{record_activity, ActivityAction, ActivityEntry, ActivitySink};
use crate::error::{StoreError, StoreResult};
use crate::models::BackupRecord;
use crate::storage::Storage;

use super::artifact::{sha256_hex, ArtifactStore};
use super::executor::RestoreExecutor;
use super::planner::ConflictStrategy;
use super::report::RestoreReport;
use super::snapshot::Snapshot;

/// Options for one restore invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Compute decisions only; write nothing
    pub preview: bool,
    pub conflict_strategy: ConflictStrategy,
    /// Categories and products
    pub include_products: bool,
    /// Accepted for symmetry with export; orders are never written
    pub include_orders: bool,
    pub include_customers: bool,
    pub include_settings: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            preview: false,
            conflict_strategy: ConflictStrategy::Skip,
            include_products: true,
            include_orders: false,
            include_customers: true,
            include_settings: true,
        }
    }
}

/// Restore request as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,
    #[serde(default = "default_true")]
    pub restore_products: bool,
    #[serde(default)]
    pub restore_orders: bool,
    #[serde(default = "default_true")]
    pub restore_customers: bool,
    #[serde(default = "default_true")]
    pub restore_settings: bool,
}

fn default_true() -> bool {
    true
}

impl From<RestoreRequest> for RestoreOptions {
    fn from(request: RestoreRequest) -> Self {
        Self {
            preview: request.preview,
            conflict_strategy: request.conflict_strategy,
            include_products: request.restore_products,
            include_orders: request.restore_orders,
            include_customers: request.restore_customers,
            include_settings: request.restore_settings,
        }
    }
}

/// Restores backups into a store
pub struct RestoreManager<'a> {
    storage: &'a Storage,
    artifacts: &'a dyn ArtifactStore,
    activity: &'a dyn ActivitySink,
    timeout: Duration,
}

impl<'a> RestoreManager<'a> {
    pub fn new(
        storage: &'a Storage,
        artifacts: &'a dyn ArtifactStore,
        activity: &'a dyn ActivitySink,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            artifacts,
            activity,
            timeout,
        }
    }

    /// Restore (or preview) the backup identified by full id or short prefix
    ///
    /// The caller is responsible for making sure no other restore runs
    /// against the same store.
    pub fn restore(
        &self,
        backup_id: &str,
        options: &RestoreOptions,
        actor: &str,
    ) -> StoreResult<RestoreReport> {
        let record = self
            .storage
            .backups
            .find(backup_id)?
            .ok_or_else(|| StoreError::backup_not_found(backup_id))?;

        info!(
            backup = %record.id.short(),
            preview = options.preview,
            strategy = %options.conflict_strategy,
            actor,
            "restore requested"
        );

        let result = self.restore_record(&record, options);

        let entry = match &result {
            Ok(report) => {
                let action = if options.preview {
                    ActivityAction::RestorePreviewed
                } else {
                    ActivityAction::RestoreApplied
                };
                ActivityEntry::new(actor, action, record.id).with_details(&json!({
                    "strategy": options.conflict_strategy,
                    "summary": report.summary(),
                }))
            }
            Err(e) => ActivityEntry::new(actor, ActivityAction::RestoreAborted, record.id)
                .with_details(&json!({ "error": e.to_string() })),
        };
        record_activity(self.activity, entry);

        result
    }

    fn restore_record(
        &self,
        record: &BackupRecord,
        options: &RestoreOptions,
    ) -> StoreResult<RestoreReport> {
        let url = record.restorable_url()?;
        let bytes = self.artifacts.fetch(url)?;
        verify_checksum(record, &bytes)?;

        let snapshot = Snapshot::parse(&bytes)?;
        self.restore_snapshot(&snapshot, options)
    }

    /// Preview or apply an already validated snapshot
    pub fn restore_snapshot(
        &self,
        snapshot: &Snapshot,
        options: &RestoreOptions,
    ) -> StoreResult<RestoreReport> {
        RestoreExecutor::new(self.storage, self.timeout).execute(snapshot, options)
    }
}

fn verify_checksum(record: &BackupRecord, bytes: &[u8]) -> StoreResult<()> {
    // Records written before checksums were kept have none to compare
    let Some(expected) = record.checksum.as_deref() else {
        return Ok(());
    };

    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(StoreError::artifact(format!(
            "Checksum mismatch for {}: expected {}, got {}",
            record.filename, expected, actual
        )));
    }
    Ok(())
}
