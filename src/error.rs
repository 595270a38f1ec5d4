//! Custom error types for Storevault
//!
//! This module defines the error hierarchy for the backup engine using thiserror
//! for ergonomic error definitions. Errors fall into two tiers: record-level
//! failures raised by a single create/update, and operation-level failures that
//! abort a whole export or restore.

use thiserror::Error;

/// The main error type for Storevault operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for entity fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store constraint violations (foreign keys, write exclusions on a record)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A backup record is not in a state that allows the requested operation
    #[error("Backup {id} is {status}: {reason}")]
    InvalidState {
        id: String,
        status: String,
        reason: String,
    },

    /// Snapshot document failed to parse or validate
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Artifact could not be stored, fetched or verified
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// The transactional unit exceeded its deadline
    #[error("Transaction timed out after {elapsed_ms} ms (limit {limit_ms} ms)")]
    TransactionTimeout { elapsed_ms: u128, limit_ms: u128 },

    /// The transactional unit failed as a whole
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Create a "not found" error for backup records
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a new invalid snapshot error
    pub fn invalid_snapshot(msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this error invalidates the whole transactional unit.
    ///
    /// Record-level errors are caught and tallied by the restore executor;
    /// anything classified here escapes it and aborts the restore.
    pub fn is_transaction_fatal(&self) -> bool {
        matches!(
            self,
            Self::TransactionTimeout { .. }
                | Self::TransactionAborted(_)
                | Self::Io(_)
                | Self::Storage(_)
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Storevault operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = StoreError::backup_not_found("b-123");
        assert_eq!(err.to_string(), "Backup not found: b-123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_state_error() {
        let err = StoreError::InvalidState {
            id: "b-1".into(),
            status: "FAILED".into(),
            reason: "only completed backups can be restored".into(),
        };
        assert_eq!(
            err.to_string(),
            "Backup b-1 is FAILED: only completed backups can be restored"
        );
    }

    #[test]
    fn test_transaction_fatal_classification() {
        assert!(StoreError::TransactionTimeout {
            elapsed_ms: 10,
            limit_ms: 5
        }
        .is_transaction_fatal());
        assert!(StoreError::TransactionAborted("disk full".into()).is_transaction_fatal());

        assert!(!StoreError::Validation("empty name".into()).is_transaction_fatal());
        assert!(!StoreError::Constraint("missing category".into()).is_transaction_fatal());
        assert!(!StoreError::Duplicate {
            entity_type: "Category",
            identifier: "shoes".into()
        }
        .is_transaction_fatal());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}
