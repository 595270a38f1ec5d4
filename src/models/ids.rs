//! Strongly-typed ID wrappers for all entity types
//!
//! Storefront entities keep the identity key they were given by the platform
//! (often not a UUID), so those IDs wrap a `String`. Backup records are minted
//! locally and use UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate string-backed ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identity key
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Create a new random ID
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the identity key as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(CategoryId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CustomerId);
define_id!(SettingId);
define_id!(OrderId);

/// Identifier of a backup record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupId(Uuid);

impl BackupId {
    const PREFIX: &'static str = "bak-";

    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short display form, e.g. `bak-1a2b3c4d`
    pub fn short(&self) -> String {
        format!("{}{}", Self::PREFIX, &self.0.to_string()[..8])
    }

    /// Whether `fragment` (with or without the `bak-` prefix) identifies this ID
    pub fn matches_prefix(&self, fragment: &str) -> bool {
        let fragment = fragment.strip_prefix(Self::PREFIX).unwrap_or(fragment);
        !fragment.is_empty() && self.0.to_string().starts_with(&fragment.to_lowercase())
    }
}

impl Default for BackupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BackupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_keeps_identity() {
        let id = CategoryId::new("C1");
        assert_eq!(id.as_str(), "C1");
        assert_eq!(id.to_string(), "C1");
        assert_eq!(CategoryId::from("C1"), id);
    }

    #[test]
    fn test_string_id_serializes_transparently() {
        let id = ProductId::new("P-100");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P-100\"");
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(CustomerId::generate(), CustomerId::generate());
    }

    #[test]
    fn test_backup_id_short_and_prefix() {
        let id = BackupId::new();
        let short = id.short();
        assert!(short.starts_with("bak-"));
        assert_eq!(short.len(), 12);
        assert!(id.matches_prefix(&short));
        assert!(id.matches_prefix(&id.to_string()));
        assert!(!id.matches_prefix("bak-"));
    }

    #[test]
    fn test_backup_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: BackupId = uuid_str.parse().unwrap();
        assert_eq!(id.to_string(), uuid_str);

        let prefixed: BackupId = format!("bak-{}", uuid_str).parse().unwrap();
        assert_eq!(prefixed, id);
    }
}
