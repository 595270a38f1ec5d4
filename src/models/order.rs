//! Order model
//!
//! Orders are financial records written by checkout. This crate only ever
//! reads them: they may be embedded in a snapshot for archival, and are never
//! written back by a restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CustomerId, OrderId, ProductId};
use super::money::Money;

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

/// A line item on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,

    /// Human-facing order number, e.g. `#1042`
    pub order_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    pub total: Money,

    #[serde(default)]
    pub status: OrderStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, order_number: impl Into<String>, total: Money) -> Self {
        Self {
            id: id.into(),
            order_number: order_number.into(),
            customer_id: None,
            items: Vec::new(),
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
