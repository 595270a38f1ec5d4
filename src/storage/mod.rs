//! Storage layer for Storevault
//!
//! Provides the JSON-file entity store: one repository per collection with
//! atomic writes, a registry of backup records, and a transactional unit for
//! multi-record writes.
//!
//! The store is always passed around explicitly as `&Storage`; nothing in the
//! crate resolves it from global state, so tests open isolated instances in
//! temporary directories.

pub mod backups;
pub mod entity;
pub mod file_io;
pub mod repository;
pub mod transaction;

pub use backups::BackupRepository;
pub use entity::Entity;
pub use file_io::{read_json, write_json_atomic};
pub use repository::Repository;
pub use transaction::{StagedState, Transaction};

use std::time::Duration;

use serde::Serialize;

use crate::config::paths::StorePaths;
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Customer, Order, Product, Setting};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: StorePaths,
    pub categories: Repository<Category>,
    pub products: Repository<Product>,
    pub customers: Repository<Customer>,
    pub settings: Repository<Setting>,
    pub orders: Repository<Order>,
    pub backups: BackupRepository,
}

/// Per-collection record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
    pub settings: usize,
    pub orders: usize,
}

impl Storage {
    /// Create a new Storage instance without loading data
    pub fn new(paths: StorePaths) -> Result<Self, StoreError> {
        paths.ensure_directories()?;

        Ok(Self {
            categories: Repository::new(paths.categories_file()),
            products: Repository::new(paths.products_file()),
            customers: Repository::new(paths.customers_file()),
            settings: Repository::new(paths.settings_store_file()),
            orders: Repository::new(paths.orders_file()),
            backups: BackupRepository::new(paths.backups_file()),
            paths,
        })
    }

    /// Create a Storage instance and load everything from disk
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), StoreError> {
        self.categories.load()?;
        self.products.load()?;
        self.customers.load()?;
        self.settings.load()?;
        self.orders.load()?;
        self.backups.load()?;
        Ok(())
    }

    /// Look up a record of any collection by ID
    pub fn find_by_id<T: Entity>(&self, id: &str) -> StoreResult<Option<T>> {
        T::repository(self).get(id)
    }

    /// Whether a record of any collection exists by ID
    pub fn exists<T: Entity>(&self, id: &str) -> StoreResult<bool> {
        T::repository(self).contains(id)
    }

    /// Record counts per collection
    pub fn stats(&self) -> StoreResult<StoreStats> {
        Ok(StoreStats {
            categories: self.categories.count()?,
            products: self.products.count()?,
            customers: self.customers.count()?,
            settings: self.settings.count()?,
            orders: self.orders.count()?,
        })
    }

    /// Run `f` inside one transactional unit bounded by `timeout`
    ///
    /// Changes are persisted only if `f` returns `Ok` and the commit
    /// succeeds within the deadline.
    pub fn transaction<R, F>(&self, timeout: Duration, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Transaction) -> StoreResult<R>,
    {
        let mut tx = Transaction::begin(self, timeout)?;
        let value = f(&mut tx)?;
        tx.commit(self)?;
        Ok(value)
    }
}
