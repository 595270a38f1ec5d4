//! Restore execution
//!
//! Walks a snapshot in dependency order (settings, categories, products,
//! customers) and applies the planner's decision for every record inside one
//! transactional unit. Each record is applied through [`apply_isolated`]: a
//! record-level failure is tallied as an error message and the batch moves
//! on, while a transaction-level failure aborts the whole restore.
//!
//! Orders are never written, whatever the options say.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::{parents_first, EntityKind};
use crate::storage::{Entity, Storage, Transaction};

use super::planner::{plan, ConflictStrategy, Decision};
use super::report::{RestorePhase, RestoreReport, RestoreResults, Tally};
use super::restore::RestoreOptions;
use super::snapshot::{ProductRecord, Snapshot};

/// Applies (or previews) one snapshot against a store
pub struct RestoreExecutor<'a> {
    storage: &'a Storage,
    timeout: Duration,
    phase: RestorePhase,
}

impl<'a> RestoreExecutor<'a> {
    /// Create an executor whose transactional unit is bounded by `timeout`
    pub fn new(storage: &'a Storage, timeout: Duration) -> Self {
        Self {
            storage,
            timeout,
            phase: RestorePhase::NotStarted,
        }
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    /// Preview or apply, as the options request
    pub fn execute(
        &mut self,
        snapshot: &Snapshot,
        options: &RestoreOptions,
    ) -> StoreResult<RestoreReport> {
        if options.preview {
            self.preview(snapshot, options)
        } else {
            self.apply(snapshot, options)
        }
    }

    /// Tally the planner's decisions without writing anything
    ///
    /// Ids planned for creation earlier in the same collection count as
    /// existing for later records, matching what apply would see.
    pub fn preview(
        &mut self,
        snapshot: &Snapshot,
        options: &RestoreOptions,
    ) -> StoreResult<RestoreReport> {
        let strategy = options.conflict_strategy;
        let data = &snapshot.data;
        let mut results = RestoreResults::default();

        if options.include_settings {
            self.preview_collection(&data.settings, strategy, results.tally_mut(EntityKind::Setting))?;
        }

        if options.include_products {
            self.preview_collection(
                &data.categories,
                strategy,
                results.tally_mut(EntityKind::Category),
            )?;
            let products: Vec<_> = data.products.iter().map(|r| r.product.clone()).collect();
            self.preview_collection(&products, strategy, results.tally_mut(EntityKind::Product))?;
        }

        if options.include_customers {
            self.preview_collection(&data.customers, strategy, results.tally_mut(EntityKind::Customer))?;
        }

        log_skipped_orders(snapshot, options);

        self.phase = RestorePhase::Previewed;
        info!(strategy = %strategy, "restore previewed");
        Ok(RestoreReport::preview(results))
    }

    fn preview_collection<T: Entity>(
        &self,
        records: &[T],
        strategy: ConflictStrategy,
        tally: &mut Tally,
    ) -> StoreResult<()> {
        let mut planned: HashSet<&str> = HashSet::new();

        for record in records {
            let exists = planned.contains(record.id()) || self.storage.exists::<T>(record.id())?;
            let decision = plan(exists, strategy);
            if decision == Decision::Create {
                planned.insert(record.id());
            }
            tally.record(decision);
        }

        Ok(())
    }

    /// Apply the snapshot inside one transactional unit
    ///
    /// Returns the per-entity tallies when the unit commits. A transaction
    /// failure leaves the store untouched and is returned as the error.
    pub fn apply(
        &mut self,
        snapshot: &Snapshot,
        options: &RestoreOptions,
    ) -> StoreResult<RestoreReport> {
        let strategy = options.conflict_strategy;
        let data = &snapshot.data;

        self.phase = RestorePhase::Applying;
        info!(strategy = %strategy, timeout_secs = self.timeout.as_secs(), "restore applying");

        let outcome = self.storage.transaction(self.timeout, |tx| {
            let mut results = RestoreResults::default();

            if options.include_settings {
                restore_collection(
                    tx,
                    data.settings.iter().cloned(),
                    strategy,
                    results.tally_mut(EntityKind::Setting),
                )?;
            }

            if options.include_products {
                restore_collection(
                    tx,
                    parents_first(&data.categories).into_iter(),
                    strategy,
                    results.tally_mut(EntityKind::Category),
                )?;
                restore_collection(
                    tx,
                    data.products.iter().cloned().map(ProductRecord::into_product),
                    strategy,
                    results.tally_mut(EntityKind::Product),
                )?;
            }

            if options.include_customers {
                restore_collection(
                    tx,
                    data.customers.iter().cloned(),
                    strategy,
                    results.tally_mut(EntityKind::Customer),
                )?;
            }

            log_skipped_orders(snapshot, options);
            Ok(results)
        });

        match outcome {
            Ok(results) => {
                self.phase = RestorePhase::Applied;
                let report = RestoreReport::applied(results);
                info!(
                    created = report.total_created(),
                    updated = report.total_updated(),
                    skipped = report.total_skipped(),
                    errors = report.total_errors(),
                    "restore applied"
                );
                Ok(report)
            }
            Err(e) => {
                self.phase = RestorePhase::Aborted;
                warn!(error = %e, "restore aborted");
                Err(e)
            }
        }
    }
}

fn log_skipped_orders(snapshot: &Snapshot, options: &RestoreOptions) {
    if options.include_orders && !snapshot.data.orders.is_empty() {
        info!(
            orders = snapshot.data.orders.len(),
            "order records are archival only and were not restored"
        );
    }
}

fn restore_collection<T, I>(
    tx: &mut Transaction,
    records: I,
    strategy: ConflictStrategy,
    tally: &mut Tally,
) -> StoreResult<()>
where
    T: Entity,
    I: IntoIterator<Item = T>,
{
    for record in records {
        let label = error_label(&record);

        match apply_isolated(tx, record, strategy)? {
            Ok(decision) => {
                debug!(record = %label, ?decision, "record restored");
                tally.record(decision);
            }
            Err(e) => {
                warn!(record = %label, error = %e, "record failed");
                tally.errors.push(format!("{}: {}", label, e));
            }
        }
    }
    Ok(())
}

/// `"<EntityLabel> <naturalKey>"`, falling back to the id
fn error_label<T: Entity>(record: &T) -> String {
    let key = match record.natural_key().trim() {
        "" => record.id(),
        key => key,
    };
    format!("{} {}", T::KIND.label(), key)
}

/// Plan and apply one record, isolating record-level failures
///
/// The outer result carries transaction-level errors, which must abort the
/// restore; the inner result carries the record's own outcome.
pub fn apply_isolated<T: Entity>(
    tx: &mut Transaction,
    record: T,
    strategy: ConflictStrategy,
) -> StoreResult<Result<Decision, StoreError>> {
    match apply(tx, record, strategy) {
        Err(e) if e.is_transaction_fatal() => Err(e),
        outcome => Ok(outcome),
    }
}

fn apply<T: Entity>(
    tx: &mut Transaction,
    record: T,
    strategy: ConflictStrategy,
) -> StoreResult<Decision> {
    let decision = plan(tx.exists::<T>(record.id())?, strategy);

    match decision {
        Decision::Create => {
            tx.create(record)?;
        }
        Decision::Update => {
            let id = record.id().to_string();
            tx.update(&id, record)?;
        }
        Decision::Skip => {}
    }

    Ok(decision)
}
