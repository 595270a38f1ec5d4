//! Activity entry data structures
//!
//! Defines who did what to which backup, as recorded in the activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::BackupId;

/// Types of backup activity that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    BackupCreated,
    BackupFailed,
    BackupDeleted,
    RestorePreviewed,
    RestoreApplied,
    RestoreAborted,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::BackupCreated => write!(f, "BACKUP_CREATED"),
            ActivityAction::BackupFailed => write!(f, "BACKUP_FAILED"),
            ActivityAction::BackupDeleted => write!(f, "BACKUP_DELETED"),
            ActivityAction::RestorePreviewed => write!(f, "RESTORE_PREVIEWED"),
            ActivityAction::RestoreApplied => write!(f, "RESTORE_APPLIED"),
            ActivityAction::RestoreAborted => write!(f, "RESTORE_ABORTED"),
        }
    }
}

/// A single activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// When the activity occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Who triggered it
    pub actor: String,

    pub action: ActivityAction,

    /// Backup the activity concerns
    pub backup_id: BackupId,

    /// Free-form context (inclusion flags, tallies, error message)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ActivityEntry {
    /// Create an entry stamped with the current time
    pub fn new(actor: impl Into<String>, action: ActivityAction, backup_id: BackupId) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            backup_id,
            details: None,
        }
    }

    /// Attach serializable details; serialization failures drop the details
    pub fn with_details<T: Serialize>(mut self, details: &T) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// One-line description for terminal output
    pub fn format_human_readable(&self) -> String {
        format!(
            "{} {} {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.backup_id.short(),
            self.actor
        )
    }
}
