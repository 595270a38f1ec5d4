//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure. Writes
//! are split into a staging step (serialize to a sibling temp file and sync)
//! and a promotion step (rename over the target), so a transaction can stage
//! every collection before touching any of them. A reversible promotion keeps
//! the previous contents aside until the caller finishes or reverts it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| StoreError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| StoreError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// A serialized file waiting to be renamed over its target
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    /// Rename the staged file over its target
    pub fn promote(self) -> Result<(), StoreError> {
        fs::rename(&self.temp_path, &self.target).map_err(|e| {
            let _ = fs::remove_file(&self.temp_path);
            StoreError::Storage(format!(
                "Failed to replace {}: {}",
                self.target.display(),
                e
            ))
        })
    }

    /// Rename the staged file over its target, copying the old target aside
    pub fn promote_reversible(self) -> Result<PromotedFile, StoreError> {
        let backup = if self.target.exists() {
            let backup = self.target.with_extension("json.bak");
            if let Err(e) = fs::copy(&self.target, &backup) {
                let _ = fs::remove_file(&self.temp_path);
                return Err(StoreError::Storage(format!(
                    "Failed to back up {}: {}",
                    self.target.display(),
                    e
                )));
            }
            Some(backup)
        } else {
            None
        };

        let target = self.target.clone();
        match self.promote() {
            Ok(()) => Ok(PromotedFile { target, backup }),
            Err(e) => {
                if let Some(backup) = backup {
                    let _ = fs::remove_file(backup);
                }
                Err(e)
            }
        }
    }

    /// Remove the staged file without touching the target
    pub fn discard(self) {
        let _ = fs::remove_file(&self.temp_path);
    }
}

/// A target replaced by a reversible promotion
#[derive(Debug)]
pub struct PromotedFile {
    target: PathBuf,
    backup: Option<PathBuf>,
}

impl PromotedFile {
    /// Keep the new contents and drop the saved copy
    pub fn finish(self) {
        if let Some(backup) = &self.backup {
            if let Err(e) = fs::remove_file(backup) {
                warn!(path = %backup.display(), error = %e, "failed to remove backup copy");
            }
        }
    }

    /// Put the previous contents back, or remove a target that did not exist
    pub fn revert(self) -> Result<(), StoreError> {
        let reverted = match &self.backup {
            Some(backup) => fs::rename(backup, &self.target),
            None => fs::remove_file(&self.target),
        };

        reverted.map_err(|e| {
            StoreError::Storage(format!("Failed to revert {}: {}", self.target.display(), e))
        })
    }
}

/// Serialize `data` next to `path` and sync it, without replacing `path`
pub fn stage_json<T, P>(path: P, data: &T) -> Result<StagedFile, StoreError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StoreError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| StoreError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    let written = serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| StoreError::Storage(format!("Failed to serialize data: {}", e)))
        .and_then(|_| {
            writer
                .flush()
                .map_err(|e| StoreError::Storage(format!("Failed to flush data: {}", e)))
        })
        .and_then(|_| {
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| StoreError::Storage(format!("Failed to sync data: {}", e)))
        });

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(StagedFile {
        temp_path,
        target: path.to_path_buf(),
    })
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), StoreError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    stage_json(path, data)?.promote()
}
