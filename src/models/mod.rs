//! Core data models for Storevault
//!
//! This module contains the storefront entities a snapshot carries
//! (categories, products, customers, settings, orders) and the backup record
//! that describes each snapshot.

pub mod backup;
pub mod category;
pub mod customer;
pub mod ids;
pub mod money;
pub mod order;
pub mod product;
pub mod setting;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use backup::{BackupRecord, BackupStatus, BackupType, InclusionFlags, StoredArtifact};
pub use category::{parents_first, Category, CategoryValidationError};
pub use customer::{Address, Customer, CustomerValidationError};
pub use ids::{BackupId, CategoryId, CustomerId, OrderId, ProductId, SettingId, VariantId};
pub use money::Money;
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{Product, ProductImage, ProductValidationError, ProductVariant};
pub use setting::Setting;

/// The entity collections a snapshot can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Product,
    Customer,
    Setting,
    Order,
}

impl EntityKind {
    /// Label used in per-record error messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Category => "Category",
            EntityKind::Product => "Product",
            EntityKind::Customer => "Customer",
            EntityKind::Setting => "Setting",
            EntityKind::Order => "Order",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
