//! Generic JSON-file repository
//!
//! One repository per collection. Records are kept in memory behind a
//! `RwLock` keyed by identity, and persisted as a JSON array sorted by id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;

use super::entity::Entity;
use super::file_io::{read_json, stage_json, write_json_atomic, StagedFile};

/// Repository for one entity collection
pub struct Repository<T> {
    path: PathBuf,
    records: RwLock<HashMap<String, T>>,
}

impl<T: Entity> Repository<T> {
    /// Create a new repository backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load records from disk
    pub fn load(&self) -> Result<(), StoreError> {
        let file_data: Vec<T> = read_json(&self.path)?;

        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        records.clear();
        for record in file_data {
            records.insert(record.id().to_string(), record);
        }

        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(&self.path, &sorted(&records))
    }

    /// Get a record by ID
    pub fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.get(id).cloned())
    }

    /// Check whether a record with this ID exists
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.contains_key(id))
    }

    /// Get all records, sorted by ID
    pub fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(sorted(&records))
    }

    /// Count records
    pub fn count(&self) -> Result<usize, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.len())
    }

    /// Insert or replace a record without constraint checks
    ///
    /// Used for collections this crate does not own (orders arrive from
    /// checkout). Storefront entities go through a `Transaction`.
    pub fn upsert(&self, record: T) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        records.insert(record.id().to_string(), record);
        Ok(())
    }

    /// Clone the current contents for staging
    pub(crate) fn snapshot(&self) -> Result<HashMap<String, T>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.clone())
    }

    /// Serialize a staged collection next to the backing file
    pub(crate) fn stage(&self, staged: &HashMap<String, T>) -> Result<StagedFile, StoreError> {
        stage_json(&self.path, &sorted(staged))
    }

    /// Swap in a committed collection
    pub(crate) fn replace_all(&self, staged: HashMap<String, T>) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *records = staged;
        Ok(())
    }
}

fn sorted<T: Entity>(records: &HashMap<String, T>) -> Vec<T> {
    let mut list: Vec<_> = records.values().cloned().collect();
    list.sort_by(|a, b| a.id().cmp(b.id()));
    list
}
