//! Product model with its nested images and variants
//!
//! Images and variants are owned by the product and travel with it, so a
//! product can be recreated from a single record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::slugify;
use super::ids::{CategoryId, ProductId, VariantId};
use super::money::Money;

/// A product image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub position: u32,
}

/// A purchasable variant of a product (size, color, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    /// Option values, e.g. `{"size": "M"}`
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,

    pub name: String,

    /// URL slug, unique among products
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Base price
    pub price: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,

    #[serde(default)]
    pub stock: i64,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Category this product is filed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub images: Vec<ProductImage>,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Create a new product with the given identity, name and price
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            slug: slugify(&name),
            name,
            sku: None,
            description: None,
            price,
            compare_at_price: None,
            stock: 0,
            active: true,
            category_id: None,
            images: Vec::new(),
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// File the product under a category
    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Total stock across the product and its variants
    pub fn total_stock(&self) -> i64 {
        self.stock + self.variants.iter().map(|v| v.stock).sum::<i64>()
    }

    /// Validate the product
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }

        if self.slug.trim().is_empty() {
            return Err(ProductValidationError::EmptySlug);
        }

        if self.price.is_negative() {
            return Err(ProductValidationError::NegativePrice(self.price));
        }

        if self.stock < 0 {
            return Err(ProductValidationError::NegativeStock(self.stock));
        }

        for variant in &self.variants {
            if variant.name.trim().is_empty() {
                return Err(ProductValidationError::InvalidVariant(
                    variant.id.to_string(),
                    "name cannot be empty".into(),
                ));
            }
            if variant.price.is_negative() {
                return Err(ProductValidationError::InvalidVariant(
                    variant.id.to_string(),
                    format!("price cannot be negative ({})", variant.price),
                ));
            }
        }

        if self.images.iter().any(|img| img.url.trim().is_empty()) {
            return Err(ProductValidationError::EmptyImageUrl);
        }

        Ok(())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.price)
    }
}

/// Validation errors for products
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    EmptySlug,
    NegativePrice(Money),
    NegativeStock(i64),
    InvalidVariant(String, String),
    EmptyImageUrl,
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Product name cannot be empty"),
            Self::EmptySlug => write!(f, "Product slug cannot be empty"),
            Self::NegativePrice(price) => write!(f, "Price cannot be negative ({})", price),
            Self::NegativeStock(stock) => write!(f, "Stock cannot be negative ({})", stock),
            Self::InvalidVariant(id, reason) => write!(f, "Variant {}: {}", id, reason),
            Self::EmptyImageUrl => write!(f, "Image URL cannot be empty"),
        }
    }
}

impl std::error::Error for ProductValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, price: i64, stock: i64) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            name: format!("Variant {}", id),
            sku: None,
            price: Money::from_cents(price),
            stock,
            options: BTreeMap::new(),
        }
    }

    #[test]
    fn test_new_product() {
        let product = Product::new("P1", "Canvas Tote", Money::from_cents(2500)).in_category("C1");
        assert_eq!(product.slug, "canvas-tote");
        assert_eq!(product.category_id, Some(CategoryId::new("C1")));
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_total_stock() {
        let mut product = Product::new("P1", "Tee", Money::from_cents(1500));
        product.stock = 2;
        product.variants = vec![variant("V1", 1500, 3), variant("V2", 1500, 5)];
        assert_eq!(product.total_stock(), 10);
    }

    #[test]
    fn test_product_validation() {
        let mut product = Product::new("P1", "Tee", Money::from_cents(1500));
        assert!(product.validate().is_ok());

        product.price = Money::from_cents(-1);
        assert!(matches!(
            product.validate(),
            Err(ProductValidationError::NegativePrice(_))
        ));

        product.price = Money::from_cents(1500);
        product.variants = vec![variant("V1", -10, 0)];
        assert!(matches!(
            product.validate(),
            Err(ProductValidationError::InvalidVariant(_, _))
        ));
    }

    #[test]
    fn test_deserialize_nested_record() {
        let json = r#"{
            "id": "P7",
            "name": "Rain Jacket",
            "slug": "rain-jacket",
            "price": 8900,
            "categoryId": "C3",
            "images": [{"url": "https://cdn.example/p7.jpg", "position": 1}],
            "variants": [{"id": "P7-M", "name": "Medium", "price": 8900, "stock": 4, "options": {"size": "M"}}]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category_id, Some(CategoryId::new("C3")));
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.variants[0].options["size"], "M");
        assert!(product.validate().is_ok());
    }
}
