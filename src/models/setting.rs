//! Store setting model
//!
//! Settings are free-form key/value pairs (shop name, tax rules, shipping
//! zones). Values are arbitrary JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::SettingId;

/// A single store setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: SettingId,

    /// Setting key, unique among settings
    pub key: String,

    #[serde(default)]
    pub value: serde_json::Value,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(
        id: impl Into<SettingId>,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value,
            updated_at: Utc::now(),
        }
    }

    /// Validate the setting key
    ///
    /// Keys are dotted lowercase identifiers such as `checkout.guest_enabled`.
    pub fn validate(&self) -> Result<(), String> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err("Setting key cannot be empty".into());
        }

        let valid = key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
        if !valid || key.starts_with('.') || key.ends_with('.') {
            return Err(format!("Invalid setting key: {}", key));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setting_keys() {
        assert!(Setting::new("S1", "shop.name", json!("Acme")).validate().is_ok());
        assert!(Setting::new("S2", "tax_rate", json!(0.2)).validate().is_ok());
        assert!(Setting::new("S3", "", json!(null)).validate().is_err());
        assert!(Setting::new("S4", "Shop Name", json!(1)).validate().is_err());
        assert!(Setting::new("S5", "shop.", json!(1)).validate().is_err());
    }
}
