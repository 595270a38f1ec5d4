//! Snapshot assembly
//!
//! Reads the included collections from an explicit store handle. Categories
//! are written parents first. Products carry a copy of their category's
//! identity inline for readers of the document; restoring a product still
//! needs that category in the target store or earlier in the snapshot.

use std::collections::HashMap;

use tracing::debug;

use crate::error::StoreResult;
use crate::models::{parents_first, InclusionFlags};
use crate::storage::Storage;

use super::snapshot::{CategoryRef, ProductRecord, Snapshot, SnapshotData};

/// Builds snapshot documents from a store
pub struct SnapshotBuilder<'a> {
    storage: &'a Storage,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Assemble a snapshot of the included collections
    ///
    /// Pure read. Any data-access error is returned as-is; the caller owns
    /// the decision to fail the backup.
    pub fn build(&self, inclusion: &InclusionFlags) -> StoreResult<Snapshot> {
        let mut data = SnapshotData::default();

        if inclusion.include_products {
            let categories = parents_first(&self.storage.categories.get_all()?);
            let refs: HashMap<String, CategoryRef> = categories
                .iter()
                .map(|c| (c.id.as_str().to_string(), CategoryRef::from(c)))
                .collect();

            data.products = self
                .storage
                .products
                .get_all()?
                .into_iter()
                .map(|product| {
                    let category = product
                        .category_id
                        .as_ref()
                        .and_then(|id| refs.get(id.as_str()).cloned());
                    ProductRecord { product, category }
                })
                .collect();
            data.categories = categories;
        }

        if inclusion.include_customers {
            data.customers = self.storage.customers.get_all()?;
        }

        if inclusion.include_settings {
            data.settings = self.storage.settings.get_all()?;
        }

        if inclusion.include_orders {
            data.orders = self.storage.orders.get_all()?;
        }

        debug!(
            categories = data.categories.len(),
            products = data.products.len(),
            customers = data.customers.len(),
            settings = data.settings.len(),
            orders = data.orders.len(),
            "snapshot assembled"
        );

        Ok(Snapshot::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::StorePaths;
    use crate::models::{Category, Customer, Money, Order, Product, Setting};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn seeded_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(StorePaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        storage
            .transaction(Duration::from_secs(5), |tx| {
                tx.create(Category::new("C1", "Shoes"))?;
                tx.create(Product::new("P1", "Runner", Money::from_cents(9900)).in_category("C1"))?;
                tx.create(Product::new("P2", "Gift Card", Money::from_cents(2500)))?;
                tx.create(Customer::new("U1", "ada@example.com"))?;
                tx.create(Setting::new("S1", "store.currency", json!("USD")))?;
                Ok(())
            })
            .unwrap();
        storage
            .orders
            .upsert(Order::new("O1", "#1001", Money::from_cents(9900)))
            .unwrap();

        (temp_dir, storage)
    }

    #[test]
    fn test_default_inclusion_excludes_orders() {
        let (_temp, storage) = seeded_storage();
        let snapshot = SnapshotBuilder::new(&storage)
            .build(&InclusionFlags::default())
            .unwrap();

        assert_eq!(snapshot.data.categories.len(), 1);
        assert_eq!(snapshot.data.products.len(), 2);
        assert_eq!(snapshot.data.customers.len(), 1);
        assert_eq!(snapshot.data.settings.len(), 1);
        assert!(snapshot.data.orders.is_empty());
        assert_eq!(snapshot.record_count(), 5);
    }

    #[test]
    fn test_products_embed_category() {
        let (_temp, storage) = seeded_storage();
        let snapshot = SnapshotBuilder::new(&storage)
            .build(&InclusionFlags::default())
            .unwrap();

        let runner = &snapshot.data.products[0];
        assert_eq!(runner.product.id.as_str(), "P1");
        assert_eq!(runner.category.as_ref().unwrap().slug, "shoes");
        assert!(snapshot.data.products[1].category.is_none());
    }

    #[test]
    fn test_flags_limit_collections() {
        let (_temp, storage) = seeded_storage();
        let inclusion = InclusionFlags {
            include_products: false,
            include_orders: true,
            include_customers: false,
            include_settings: true,
        };

        let snapshot = SnapshotBuilder::new(&storage).build(&inclusion).unwrap();
        assert!(snapshot.data.categories.is_empty());
        assert!(snapshot.data.products.is_empty());
        assert!(snapshot.data.customers.is_empty());
        assert_eq!(snapshot.data.settings.len(), 1);
        assert_eq!(snapshot.data.orders.len(), 1);
    }
}
