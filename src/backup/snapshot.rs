//! Snapshot document format
//!
//! A snapshot is the portable JSON document a backup artifact contains:
//!
//! ```text
//! { "version": "1.0", "createdAt": "...",
//!   "data": { "categories": [..], "products": [..], "customers": [..],
//!             "settings": [..], "orders": [..] } }
//! ```
//!
//! Documents are validated against the typed record schemas as soon as they
//! are fetched, so a restore never starts on a document it cannot finish
//! reading.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::models::{Category, CategoryId, Customer, Order, Product, Setting};

/// Format version written into new snapshots
pub const SNAPSHOT_VERSION: &str = "1.0";

/// A complete snapshot document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    pub data: SnapshotData,
}

/// The collections carried by a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotData {
    pub categories: Vec<Category>,
    pub products: Vec<ProductRecord>,
    pub customers: Vec<Customer>,
    pub settings: Vec<Setting>,

    /// Archival only; never written back
    pub orders: Vec<Order>,
}

/// Category linkage embedded in a product record
///
/// Informational only. It can fill a missing `categoryId`, but the category
/// itself is never created from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// A product as carried in a snapshot, with its category embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(flatten)]
    pub product: Product,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl ProductRecord {
    /// The product to write back, taking `categoryId` from the embedded
    /// category when the record has none
    pub fn into_product(self) -> Product {
        let mut product = self.product;
        if product.category_id.is_none() {
            product.category_id = self.category.map(|c| c.id);
        }
        product
    }
}

impl Snapshot {
    /// Create a snapshot at the current format version
    pub fn new(data: SnapshotData) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: Some(Utc::now()),
            data,
        }
    }

    /// Parse and validate a snapshot document
    ///
    /// Fails with `StoreError::InvalidSnapshot` when the document is not
    /// JSON, lacks `version` or `data`, has an unsupported major version,
    /// or contains a record that does not match its collection's schema.
    pub fn parse(bytes: &[u8]) -> StoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::invalid_snapshot(format!("not valid JSON: {}", e)))?;

        let mut root = match value {
            Value::Object(map) => map,
            _ => return Err(StoreError::invalid_snapshot("document is not a JSON object")),
        };

        let version = match root.remove("version") {
            Some(Value::String(version)) => version,
            Some(_) => return Err(StoreError::invalid_snapshot("version must be a string")),
            None => return Err(StoreError::invalid_snapshot("missing version")),
        };
        check_version(&version)?;

        let created_at = match root.remove("createdAt") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|e| StoreError::invalid_snapshot(format!("createdAt: {}", e)))?,
            ),
        };

        let mut data = match root.remove("data") {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => return Err(StoreError::invalid_snapshot("missing data")),
            Some(_) => return Err(StoreError::invalid_snapshot("data must be an object")),
        };

        let data = SnapshotData {
            categories: section(&mut data, "categories")?,
            products: section(&mut data, "products")?,
            customers: section(&mut data, "customers")?,
            settings: section(&mut data, "settings")?,
            orders: section(&mut data, "orders")?,
        };

        Ok(Self {
            version,
            created_at,
            data,
        })
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Json(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Total records across every collection
    pub fn record_count(&self) -> usize {
        self.data.categories.len()
            + self.data.products.len()
            + self.data.customers.len()
            + self.data.settings.len()
            + self.data.orders.len()
    }
}

fn check_version(version: &str) -> StoreResult<()> {
    let major = |v: &str| v.split('.').next().map(str::trim).map(str::to_string);
    if major(version).filter(|m| !m.is_empty()) != major(SNAPSHOT_VERSION) {
        return Err(StoreError::invalid_snapshot(format!(
            "unsupported version {} (expected {}.x)",
            version,
            SNAPSHOT_VERSION.split('.').next().unwrap_or(SNAPSHOT_VERSION)
        )));
    }
    Ok(())
}

fn section<T: DeserializeOwned>(data: &mut Map<String, Value>, key: &str) -> StoreResult<Vec<T>> {
    match data.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| StoreError::invalid_snapshot(format!("{}: {}", key, e))),
    }
}
