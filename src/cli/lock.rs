//! Restore lock
//!
//! Only one restore may run against a store at a time. The lock is a file in
//! the data directory created with create-new semantics and removed when the
//! guard is dropped.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::config::paths::StorePaths;
use crate::error::{StoreError, StoreResult};

/// Held for the duration of a restore
#[derive(Debug)]
pub struct RestoreLock {
    path: PathBuf,
}

impl RestoreLock {
    /// Take the lock, failing if another restore holds it
    pub fn acquire(paths: &StorePaths) -> StoreResult<Self> {
        let path = paths.restore_lock();

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Guard first so a failed write still removes the file
                let lock = Self { path };
                writeln!(file, "{}", std::process::id())
                    .map_err(|e| StoreError::Io(format!("Failed to write restore lock: {}", e)))?;
                Ok(lock)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::Storage(format!(
                "Another restore is in progress (remove {} if it is stale)",
                path.display()
            ))),
            Err(e) => Err(StoreError::Io(format!("Failed to create restore lock: {}", e))),
        }
    }
}

impl Drop for RestoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_exclusive_and_released() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let lock = RestoreLock::acquire(&paths).unwrap();
        assert!(paths.restore_lock().exists());
        assert!(RestoreLock::acquire(&paths).is_err());

        drop(lock);
        assert!(!paths.restore_lock().exists());
        assert!(RestoreLock::acquire(&paths).is_ok());
    }

    #[test]
    fn test_lock_records_owner_pid() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let _lock = RestoreLock::acquire(&paths).unwrap();
        let content = fs::read_to_string(paths.restore_lock()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }
}
