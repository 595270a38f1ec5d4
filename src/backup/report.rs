//! Restore result aggregation
//!
//! Per-entity tallies and the response returned to the caller. The serialized
//! form is the restore response shape:
//! `{ message, results: { products, categories, orders, customers, settings } }`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::EntityKind;

use super::planner::Decision;

/// Counters for one entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl Tally {
    /// Count one successfully applied (or previewed) decision
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Create => self.created += 1,
            Decision::Update => self.updated += 1,
            Decision::Skip => self.skipped += 1,
        }
    }

    /// Records processed, failures included
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.skipped + self.errors.len()
    }
}

/// Tallies for every entity type a snapshot can carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResults {
    pub products: Tally,
    pub categories: Tally,
    pub orders: Tally,
    pub customers: Tally,
    pub settings: Tally,
}

impl RestoreResults {
    pub fn tally(&self, kind: EntityKind) -> &Tally {
        match kind {
            EntityKind::Category => &self.categories,
            EntityKind::Product => &self.products,
            EntityKind::Customer => &self.customers,
            EntityKind::Setting => &self.settings,
            EntityKind::Order => &self.orders,
        }
    }

    pub fn tally_mut(&mut self, kind: EntityKind) -> &mut Tally {
        match kind {
            EntityKind::Category => &mut self.categories,
            EntityKind::Product => &mut self.products,
            EntityKind::Customer => &mut self.customers,
            EntityKind::Setting => &mut self.settings,
            EntityKind::Order => &mut self.orders,
        }
    }

    fn all(&self) -> [&Tally; 5] {
        [
            &self.settings,
            &self.categories,
            &self.products,
            &self.customers,
            &self.orders,
        ]
    }
}

/// Where one restore invocation ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePhase {
    NotStarted,
    /// Decisions computed, nothing written
    Previewed,
    Applying,
    Applied,
    /// The transactional unit failed; nothing was persisted
    Aborted,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestorePhase::NotStarted => write!(f, "not started"),
            RestorePhase::Previewed => write!(f, "previewed"),
            RestorePhase::Applying => write!(f, "applying"),
            RestorePhase::Applied => write!(f, "applied"),
            RestorePhase::Aborted => write!(f, "aborted"),
        }
    }
}

/// The response of one restore invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub message: String,
    pub results: RestoreResults,
}

impl RestoreReport {
    pub fn preview(results: RestoreResults) -> Self {
        Self {
            message: "Preview completed".to_string(),
            results,
        }
    }

    pub fn applied(results: RestoreResults) -> Self {
        Self {
            message: "Restore completed".to_string(),
            results,
        }
    }

    pub fn total_created(&self) -> usize {
        self.results.all().iter().map(|t| t.created).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.results.all().iter().map(|t| t.updated).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.results.all().iter().map(|t| t.skipped).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.results.all().iter().map(|t| t.errors.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Every per-record error, in processing order
    pub fn errors(&self) -> impl Iterator<Item = &String> {
        self.results.all().into_iter().flat_map(|t| t.errors.iter())
    }

    /// Get a one-line summary of the restore
    pub fn summary(&self) -> String {
        format!(
            "{}: {} created, {} updated, {} skipped, {} errors",
            self.message,
            self.total_created(),
            self.total_updated(),
            self.total_skipped(),
            self.total_errors()
        )
    }
}
