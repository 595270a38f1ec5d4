//! Artifact storage for snapshot documents
//!
//! Snapshot bytes live outside the metadata registry, addressed by URL.
//! `LocalArtifactStore` keeps them as files under the artifact directory and
//! hands out `file://` URLs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{StoreError, StoreResult};

const FILE_SCHEME: &str = "file://";

/// Blob storage for snapshot artifacts
pub trait ArtifactStore {
    /// Store bytes under a name, returning the artifact URL
    fn put(&self, name: &str, bytes: &[u8]) -> StoreResult<String>;

    /// Retrieve the bytes behind a URL
    fn fetch(&self, url: &str) -> StoreResult<Vec<u8>>;

    fn exists(&self, url: &str) -> StoreResult<bool>;

    /// Remove an artifact; removing a missing artifact is not an error
    fn delete(&self, url: &str) -> StoreResult<()>;
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Filesystem-backed artifact store
pub struct LocalArtifactStore {
    base_dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, url: &str) -> StoreResult<PathBuf> {
        let raw = url
            .strip_prefix(FILE_SCHEME)
            .ok_or_else(|| StoreError::artifact(format!("Unsupported artifact URL: {}", url)))?;

        let path = PathBuf::from(raw);
        if !path.starts_with(&self.base_dir) {
            return Err(StoreError::artifact(format!(
                "Artifact URL outside the artifact directory: {}",
                url
            )));
        }
        Ok(path)
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn put(&self, name: &str, bytes: &[u8]) -> StoreResult<String> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(StoreError::artifact(format!("Invalid artifact name: {}", name)));
        }

        fs::create_dir_all(&self.base_dir).map_err(|e| {
            StoreError::artifact(format!("Failed to create artifact directory: {}", e))
        })?;

        let path = self.base_dir.join(name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StoreError::artifact(format!("Failed to create {}: {}", name, e)))?;

        let written = file.write_all(bytes).and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(StoreError::artifact(format!("Failed to write {}: {}", name, e)));
        }

        Ok(format!("{}{}", FILE_SCHEME, path.display()))
    }

    fn fetch(&self, url: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(url)?;
        fs::read(&path)
            .map_err(|e| StoreError::artifact(format!("Artifact unreachable at {}: {}", url, e)))
    }

    fn exists(&self, url: &str) -> StoreResult<bool> {
        Ok(self.path_for(url)?.is_file())
    }

    fn delete(&self, url: &str) -> StoreResult<()> {
        let path = self.path_for(url)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::artifact(format!(
                "Failed to delete artifact {}: {}",
                url, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, LocalArtifactStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path().join("artifacts"));
        (temp_dir, store)
    }

    #[test]
    fn test_put_fetch_delete() {
        let (_temp, store) = create_test_store();

        let url = store.put("backup-a.json", b"{}").unwrap();
        assert!(url.starts_with("file://"));
        assert!(store.exists(&url).unwrap());
        assert_eq!(store.fetch(&url).unwrap(), b"{}");

        store.delete(&url).unwrap();
        assert!(!store.exists(&url).unwrap());
        store.delete(&url).unwrap();
    }

    #[test]
    fn test_put_refuses_to_overwrite() {
        let (_temp, store) = create_test_store();
        store.put("backup-a.json", b"one").unwrap();
        assert!(store.put("backup-a.json", b"two").is_err());
    }

    #[test]
    fn test_fetch_missing_is_artifact_error() {
        let (_temp, store) = create_test_store();
        let url = format!("file://{}", store.base_dir().join("gone.json").display());
        assert!(matches!(store.fetch(&url), Err(StoreError::Artifact(_))));
    }

    #[test]
    fn test_rejects_foreign_urls() {
        let (_temp, store) = create_test_store();
        assert!(store.fetch("s3://bucket/backup.json").is_err());
        assert!(store.fetch("file:///etc/passwd").is_err());
        assert!(store.put("../escape.json", b"x").is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
