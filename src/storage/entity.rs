//! Entity trait binding each model to its collection
//!
//! Every collection the store holds implements `Entity`, which tells the
//! generic repository and the transactional unit how to identify, validate
//! and constrain a record.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Customer, EntityKind, Order, Product, Setting};

use super::repository::Repository;
use super::transaction::StagedState;
use super::Storage;

/// A record type stored in one collection
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which collection this entity lives in
    const KIND: EntityKind;

    /// Whether the transactional unit accepts writes for this collection
    const WRITABLE: bool = true;

    /// Stable identity key
    fn id(&self) -> &str;

    /// Human-identifying field used to label errors
    fn natural_key(&self) -> &str;

    /// Value that must be unique across the collection, if any
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Field-level validation
    fn validate(&self) -> StoreResult<()>;

    /// Foreign-key checks against the rest of the staged store
    fn check_references(&self, _state: &StagedState) -> StoreResult<()> {
        Ok(())
    }

    fn repository(storage: &Storage) -> &Repository<Self>;

    fn staged(state: &StagedState) -> &HashMap<String, Self>;

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self>;
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn natural_key(&self) -> &str {
        &self.slug
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.trim().to_lowercase())
    }

    fn validate(&self) -> StoreResult<()> {
        Category::validate(self).map_err(|e| StoreError::Validation(e.to_string()))
    }

    fn check_references(&self, state: &StagedState) -> StoreResult<()> {
        match &self.parent_id {
            Some(parent) if !state.categories.contains_key(parent.as_str()) => {
                Err(StoreError::Constraint(format!(
                    "parent category {} does not exist",
                    parent
                )))
            }
            _ => Ok(()),
        }
    }

    fn repository(storage: &Storage) -> &Repository<Self> {
        &storage.categories
    }

    fn staged(state: &StagedState) -> &HashMap<String, Self> {
        &state.categories
    }

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self> {
        &mut state.categories
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn natural_key(&self) -> &str {
        &self.slug
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.trim().to_lowercase())
    }

    fn validate(&self) -> StoreResult<()> {
        Product::validate(self).map_err(|e| StoreError::Validation(e.to_string()))
    }

    fn check_references(&self, state: &StagedState) -> StoreResult<()> {
        match &self.category_id {
            Some(category) if !state.categories.contains_key(category.as_str()) => {
                Err(StoreError::Constraint(format!(
                    "category {} does not exist",
                    category
                )))
            }
            _ => Ok(()),
        }
    }

    fn repository(storage: &Storage) -> &Repository<Self> {
        &storage.products
    }

    fn staged(state: &StagedState) -> &HashMap<String, Self> {
        &state.products
    }

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self> {
        &mut state.products
    }
}

impl Entity for Customer {
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn natural_key(&self) -> &str {
        &self.email
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.normalized_email())
    }

    fn validate(&self) -> StoreResult<()> {
        Customer::validate(self).map_err(|e| StoreError::Validation(e.to_string()))
    }

    fn repository(storage: &Storage) -> &Repository<Self> {
        &storage.customers
    }

    fn staged(state: &StagedState) -> &HashMap<String, Self> {
        &state.customers
    }

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self> {
        &mut state.customers
    }
}

impl Entity for Setting {
    const KIND: EntityKind = EntityKind::Setting;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn natural_key(&self) -> &str {
        &self.key
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.key.trim().to_string())
    }

    fn validate(&self) -> StoreResult<()> {
        Setting::validate(self).map_err(StoreError::Validation)
    }

    fn repository(storage: &Storage) -> &Repository<Self> {
        &storage.settings
    }

    fn staged(state: &StagedState) -> &HashMap<String, Self> {
        &state.settings
    }

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self> {
        &mut state.settings
    }
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Order;

    // Orders are financial records owned by checkout
    const WRITABLE: bool = false;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn natural_key(&self) -> &str {
        &self.order_number
    }

    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    fn repository(storage: &Storage) -> &Repository<Self> {
        &storage.orders
    }

    fn staged(state: &StagedState) -> &HashMap<String, Self> {
        &state.orders
    }

    fn staged_mut(state: &mut StagedState) -> &mut HashMap<String, Self> {
        &mut state.orders
    }
}
