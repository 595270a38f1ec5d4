//! Transactional unit over the entity store
//!
//! A `Transaction` stages every write in an in-memory copy of the store.
//! Each create/update is validated in full before it is staged, so a record
//! that fails leaves no trace while earlier records stay staged (savepoint
//! semantics per record). Commit stages every touched collection file, then
//! promotes them one by one in dependency order. If a promotion fails, the
//! collections already promoted are reverted to their previous files and the
//! in-memory store is left as it was. Any transaction-level failure discards
//! the lot.
//!
//! The unit carries a deadline. It is checked before every operation and
//! again at commit; once exceeded, every call fails with
//! `StoreError::TransactionTimeout`.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Customer, EntityKind, Order, Product, Setting};

use super::entity::Entity;
use super::file_io::{PromotedFile, StagedFile};
use super::Storage;

/// Order in which touched collections are written at commit
const COMMIT_ORDER: [EntityKind; 5] = [
    EntityKind::Setting,
    EntityKind::Category,
    EntityKind::Product,
    EntityKind::Customer,
    EntityKind::Order,
];

/// In-memory copy of every collection, mutated by a transaction
#[derive(Debug, Clone, Default)]
pub struct StagedState {
    pub categories: HashMap<String, Category>,
    pub products: HashMap<String, Product>,
    pub customers: HashMap<String, Customer>,
    pub settings: HashMap<String, Setting>,
    pub orders: HashMap<String, Order>,
}

/// A unit of work against the store
pub struct Transaction {
    state: StagedState,
    dirty: HashSet<EntityKind>,
    started: Instant,
    timeout: Duration,
}

impl Transaction {
    pub(crate) fn begin(storage: &Storage, timeout: Duration) -> StoreResult<Self> {
        let state = StagedState {
            categories: storage.categories.snapshot()?,
            products: storage.products.snapshot()?,
            customers: storage.customers.snapshot()?,
            settings: storage.settings.snapshot()?,
            orders: storage.orders.snapshot()?,
        };

        debug!(timeout_ms = timeout.as_millis() as u64, "transaction started");

        Ok(Self {
            state,
            dirty: HashSet::new(),
            started: Instant::now(),
            timeout,
        })
    }

    /// Time spent inside this transaction so far
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail if the deadline has passed
    pub fn ensure_live(&self) -> StoreResult<()> {
        let elapsed = self.elapsed();
        if elapsed >= self.timeout {
            return Err(StoreError::TransactionTimeout {
                elapsed_ms: elapsed.as_millis(),
                limit_ms: self.timeout.as_millis(),
            });
        }
        Ok(())
    }

    /// Look up a staged record by ID
    pub fn find<T: Entity>(&self, id: &str) -> StoreResult<Option<T>> {
        self.ensure_live()?;
        Ok(T::staged(&self.state).get(id).cloned())
    }

    /// Whether a staged record with this ID exists
    pub fn exists<T: Entity>(&self, id: &str) -> StoreResult<bool> {
        self.ensure_live()?;
        Ok(T::staged(&self.state).contains_key(id))
    }

    /// Number of staged records in a collection
    pub fn count<T: Entity>(&self) -> usize {
        T::staged(&self.state).len()
    }

    /// Create a record that does not exist yet
    pub fn create<T: Entity>(&mut self, record: T) -> StoreResult<T> {
        self.ensure_writable::<T>()?;

        if T::staged(&self.state).contains_key(record.id()) {
            return Err(StoreError::Duplicate {
                entity_type: T::KIND.label(),
                identifier: record.id().to_string(),
            });
        }

        self.check(&record)?;
        self.stage(record)
    }

    /// Replace the fields of an existing record, keeping its identity
    pub fn update<T: Entity>(&mut self, id: &str, record: T) -> StoreResult<T> {
        self.ensure_writable::<T>()?;

        if !T::staged(&self.state).contains_key(id) {
            return Err(StoreError::NotFound {
                entity_type: T::KIND.label(),
                identifier: id.to_string(),
            });
        }

        if record.id() != id {
            return Err(StoreError::Constraint(format!(
                "identity cannot change from {} to {}",
                id,
                record.id()
            )));
        }

        self.check(&record)?;
        self.stage(record)
    }

    fn ensure_writable<T: Entity>(&self) -> StoreResult<()> {
        self.ensure_live()?;
        if !T::WRITABLE {
            return Err(StoreError::TransactionAborted(format!(
                "{} records are read-only",
                T::KIND.label()
            )));
        }
        Ok(())
    }

    fn check<T: Entity>(&self, record: &T) -> StoreResult<()> {
        record.validate()?;
        record.check_references(&self.state)?;

        if let Some(key) = record.unique_key() {
            let taken = T::staged(&self.state)
                .values()
                .any(|other| other.id() != record.id() && other.unique_key().as_ref() == Some(&key));
            if taken {
                return Err(StoreError::Duplicate {
                    entity_type: T::KIND.label(),
                    identifier: record.natural_key().to_string(),
                });
            }
        }

        Ok(())
    }

    fn stage<T: Entity>(&mut self, record: T) -> StoreResult<T> {
        T::staged_mut(&mut self.state).insert(record.id().to_string(), record.clone());
        self.dirty.insert(T::KIND);
        Ok(record)
    }

    /// Persist every touched collection
    pub(crate) fn commit(self, storage: &Storage) -> StoreResult<()> {
        self.ensure_live()?;

        if self.dirty.is_empty() {
            debug!("transaction committed with no changes");
            return Ok(());
        }

        let mut staged_files: Vec<StagedFile> = Vec::with_capacity(self.dirty.len());
        for kind in COMMIT_ORDER.iter().filter(|kind| self.dirty.contains(*kind)) {
            let staged = match kind {
                EntityKind::Category => storage.categories.stage(&self.state.categories),
                EntityKind::Product => storage.products.stage(&self.state.products),
                EntityKind::Customer => storage.customers.stage(&self.state.customers),
                EntityKind::Setting => storage.settings.stage(&self.state.settings),
                EntityKind::Order => storage.orders.stage(&self.state.orders),
            };

            match staged {
                Ok(file) => staged_files.push(file),
                Err(e) => {
                    staged_files.into_iter().for_each(StagedFile::discard);
                    return Err(StoreError::TransactionAborted(e.to_string()));
                }
            }
        }

        let mut promoted: Vec<PromotedFile> = Vec::with_capacity(staged_files.len());
        let mut pending = staged_files.into_iter();
        while let Some(file) = pending.next() {
            match file.promote_reversible() {
                Ok(done) => promoted.push(done),
                Err(e) => {
                    pending.for_each(StagedFile::discard);
                    for done in promoted.into_iter().rev() {
                        if let Err(revert_err) = done.revert() {
                            warn!(error = %revert_err, "failed to revert promoted collection");
                        }
                    }
                    return Err(StoreError::TransactionAborted(e.to_string()));
                }
            }
        }
        promoted.into_iter().for_each(PromotedFile::finish);

        let Transaction {
            mut state,
            dirty,
            started,
            ..
        } = self;

        for kind in &dirty {
            match kind {
                EntityKind::Category => storage.categories.replace_all(mem::take(&mut state.categories))?,
                EntityKind::Product => storage.products.replace_all(mem::take(&mut state.products))?,
                EntityKind::Customer => storage.customers.replace_all(mem::take(&mut state.customers))?,
                EntityKind::Setting => storage.settings.replace_all(mem::take(&mut state.settings))?,
                EntityKind::Order => storage.orders.replace_all(mem::take(&mut state.orders))?,
            }
        }

        info!(
            collections = dirty.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transaction committed"
        );
        Ok(())
    }
}
