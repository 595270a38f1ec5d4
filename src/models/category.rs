//! Product category model
//!
//! Categories form the storefront taxonomy. They may nest under a parent
//! category and are addressed by a unique slug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::ids::CategoryId;

/// A storefront category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// URL slug, unique among categories
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parent category for nested taxonomies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,

    /// Sort order for display
    #[serde(default)]
    pub sort_order: i32,

    /// Whether the category is visible on the storefront
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Create a new category with the given identity and name
    ///
    /// The slug is derived from the name.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            slug: slugify(&name),
            name,
            description: None,
            parent_id: None,
            sort_order: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Nest this category under a parent
    pub fn with_parent(mut self, parent_id: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.slug.trim().is_empty() {
            return Err(CategoryValidationError::EmptySlug);
        }

        if self.parent_id.as_ref() == Some(&self.id) {
            return Err(CategoryValidationError::SelfParent);
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Derive a URL slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Order categories so that every parent comes before its children
///
/// Only parents present in `categories` are considered. Otherwise the input
/// order is kept, and each category appears once even if parents loop.
pub fn parents_first(categories: &[Category]) -> Vec<Category> {
    let index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut emitted = vec![false; categories.len()];
    let mut ordered = Vec::with_capacity(categories.len());

    for start in 0..categories.len() {
        let mut chain = Vec::new();
        let mut cursor = Some(start);

        while let Some(i) = cursor {
            if emitted[i] || chain.contains(&i) {
                break;
            }
            chain.push(i);
            cursor = categories[i]
                .parent_id
                .as_ref()
                .and_then(|parent| index.get(parent.as_str()).copied());
        }

        for i in chain.into_iter().rev() {
            emitted[i] = true;
            ordered.push(categories[i].clone());
        }
    }

    ordered
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    EmptySlug,
    SelfParent,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 100)", len)
            }
            Self::EmptySlug => write!(f, "Category slug cannot be empty"),
            Self::SelfParent => write!(f, "Category cannot be its own parent"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let category = Category::new("C1", "Summer Shoes");
        assert_eq!(category.id.as_str(), "C1");
        assert_eq!(category.slug, "summer-shoes");
        assert!(category.active);
        assert!(category.parent_id.is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hats & Caps  "), "hats-caps");
        assert_eq!(slugify("T-Shirts"), "t-shirts");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_category_validation() {
        let mut category = Category::new("C1", "Valid");
        assert!(category.validate().is_ok());

        category.name = String::new();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "Valid".into();
        category.slug = " ".into();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptySlug));

        let looped = Category::new("C2", "Loop").with_parent("C2");
        assert_eq!(looped.validate(), Err(CategoryValidationError::SelfParent));
    }

    fn ids(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_parents_first_puts_parent_before_child() {
        let categories = vec![
            Category::new("A-child", "Shirts").with_parent("Z-parent"),
            Category::new("B-grandchild", "Tees").with_parent("A-child"),
            Category::new("M-loose", "Hats"),
            Category::new("Z-parent", "Clothing"),
        ];

        let ordered = parents_first(&categories);
        assert_eq!(ids(&ordered), vec!["Z-parent", "A-child", "B-grandchild", "M-loose"]);
    }

    #[test]
    fn test_parents_first_ignores_outside_parents_and_loops() {
        let categories = vec![
            Category::new("C1", "One").with_parent("C2"),
            Category::new("C2", "Two").with_parent("C1"),
            Category::new("C3", "Three").with_parent("elsewhere"),
        ];

        let ordered = parents_first(&categories);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ids(&ordered), vec!["C2", "C1", "C3"]);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let category: Category =
            serde_json::from_str(r#"{"id": "C9", "name": "Bags", "slug": "bags"}"#).unwrap();
        assert_eq!(category.id.as_str(), "C9");
        assert!(category.active);
        assert_eq!(category.sort_order, 0);
    }
}
