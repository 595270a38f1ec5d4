//! Backup record registry
//!
//! Persists `BackupRecord` metadata rows to `backups.json`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::{BackupId, BackupRecord};

use super::file_io::{read_json, write_json_atomic};

/// Repository for backup metadata
pub struct BackupRepository {
    path: PathBuf,
    records: RwLock<HashMap<BackupId, BackupRecord>>,
}

impl BackupRepository {
    /// Create a new backup repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load backup records from disk
    pub fn load(&self) -> Result<(), StoreError> {
        let file_data: Vec<BackupRecord> = read_json(&self.path)?;

        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        records.clear();
        for record in file_data {
            records.insert(record.id, record);
        }

        Ok(())
    }

    /// Save backup records to disk, newest first
    pub fn save(&self) -> Result<(), StoreError> {
        let list = self.get_all()?;
        write_json_atomic(&self.path, &list)
    }

    /// Get a backup by ID
    pub fn get(&self, id: BackupId) -> Result<Option<BackupRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.get(&id).cloned())
    }

    /// Find a backup by full ID or short prefix (`bak-1a2b3c4d`)
    ///
    /// Returns a validation error if the prefix is ambiguous.
    pub fn find(&self, identifier: &str) -> Result<Option<BackupRecord>, StoreError> {
        if let Ok(id) = identifier.parse::<BackupId>() {
            return self.get(id);
        }

        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let matches: Vec<_> = records
            .values()
            .filter(|r| r.id.matches_prefix(identifier))
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some((*only).clone())),
            _ => Err(StoreError::Validation(format!(
                "Backup identifier '{}' is ambiguous ({} matches)",
                identifier,
                matches.len()
            ))),
        }
    }

    /// Get all backups, newest first
    pub fn get_all(&self) -> Result<Vec<BackupRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Insert or update a backup record
    pub fn upsert(&self, record: BackupRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        records.insert(record.id, record);
        Ok(())
    }

    /// Delete a backup record
    pub fn delete(&self, id: BackupId) -> Result<bool, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(records.remove(&id).is_some())
    }

    /// Count backups
    pub fn count(&self) -> Result<usize, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.len())
    }
}
