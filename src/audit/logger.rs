//! Append-only activity log
//!
//! Each entry is written as a single JSON line and flushed immediately.
//! Recording is fire-and-forget from the caller's point of view: callers go
//! through [`record_activity`], which logs a warning instead of failing the
//! surrounding export or restore.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::error::{StoreError, StoreResult};

use super::entry::ActivityEntry;

/// Receiver of post-hoc activity records
pub trait ActivitySink {
    fn record(&self, entry: &ActivityEntry) -> StoreResult<()>;
}

/// Record an entry, swallowing and logging any failure
pub fn record_activity(sink: &dyn ActivitySink, entry: ActivityEntry) {
    if let Err(e) = sink.record(&entry) {
        warn!(
            action = %entry.action,
            backup = %entry.backup_id,
            error = %e,
            "failed to record activity"
        );
    }
}

/// Writes activity entries to a JSONL file
pub struct ActivityLog {
    log_path: PathBuf,
}

impl ActivityLog {
    /// Create a new ActivityLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> StoreResult<Vec<ActivityEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| StoreError::Io(format!("Failed to open activity log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                StoreError::Io(format!(
                    "Failed to read activity log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: ActivityEntry = serde_json::from_str(&line).map_err(|e| {
                StoreError::Json(format!(
                    "Failed to parse activity entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries
    pub fn read_recent(&self, count: usize) -> StoreResult<Vec<ActivityEntry>> {
        let all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries[start..].to_vec())
    }

    /// Get the path to the log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

impl ActivitySink for ActivityLog {
    fn record(&self, entry: &ActivityEntry) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| StoreError::Io(format!("Failed to open activity log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| StoreError::Json(format!("Failed to serialize activity entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| StoreError::Io(format!("Failed to write activity entry: {}", e)))?;

        file.flush()
            .map_err(|e| StoreError::Io(format!("Failed to flush activity log: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::ActivityAction;
    use crate::models::BackupId;
    use tempfile::TempDir;

    fn create_test_log() -> (ActivityLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = ActivityLog::new(temp_dir.path().join("activity.log"));
        (log, temp_dir)
    }

    #[test]
    fn test_record_and_read() {
        let (log, _temp) = create_test_log();
        let id = BackupId::new();

        log.record(&ActivityEntry::new("admin", ActivityAction::BackupCreated, id))
            .unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::BackupCreated);
        assert_eq!(entries[0].backup_id, id);
    }

    #[test]
    fn test_read_recent() {
        let (log, _temp) = create_test_log();

        for i in 0..5 {
            let entry = ActivityEntry::new(format!("user{}", i), ActivityAction::RestorePreviewed, BackupId::new());
            log.record(&entry).unwrap();
        }

        let recent = log.read_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].actor, "user3");
        assert_eq!(recent[1].actor, "user4");
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = create_test_log();
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_record_activity_swallows_failures() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened for append
        let log = ActivityLog::new(temp_dir.path().to_path_buf());

        record_activity(
            &log,
            ActivityEntry::new("admin", ActivityAction::RestoreApplied, BackupId::new()),
        );
    }
}
