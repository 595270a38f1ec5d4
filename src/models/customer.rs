//! Customer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CustomerId;

/// A postal address attached to a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A storefront customer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,

    /// Login email, unique among customers (case-insensitive)
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub accepts_marketing: bool,

    #[serde(default)]
    pub addresses: Vec<Address>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer
    pub fn new(id: impl Into<CustomerId>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            accepts_marketing: false,
            addresses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the customer's name
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Email normalized for uniqueness comparisons
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Validate the customer
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CustomerValidationError::EmptyEmail);
        }

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(CustomerValidationError::InvalidEmail(email.to_string())),
        }

        if self.addresses.iter().filter(|a| a.is_default).count() > 1 {
            return Err(CustomerValidationError::MultipleDefaultAddresses);
        }

        Ok(())
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            write!(f, "{}", self.email)
        } else {
            write!(f, "{} <{}>", name, self.email)
        }
    }
}

/// Validation errors for customers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerValidationError {
    EmptyEmail,
    InvalidEmail(String),
    MultipleDefaultAddresses,
}

impl fmt::Display for CustomerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Customer email cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            Self::MultipleDefaultAddresses => {
                write!(f, "Only one address can be marked as default")
            }
        }
    }
}

impl std::error::Error for CustomerValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_display() {
        let customer = Customer::new("U1", "ada@example.com").with_name("Ada", "Lovelace");
        assert_eq!(customer.to_string(), "Ada Lovelace <ada@example.com>");

        let anonymous = Customer::new("U2", "anon@example.com");
        assert_eq!(anonymous.to_string(), "anon@example.com");
    }

    #[test]
    fn test_customer_validation() {
        assert!(Customer::new("U1", "ada@example.com").validate().is_ok());
        assert_eq!(
            Customer::new("U1", "").validate(),
            Err(CustomerValidationError::EmptyEmail)
        );
        assert!(matches!(
            Customer::new("U1", "not-an-email").validate(),
            Err(CustomerValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_normalized_email() {
        let customer = Customer::new("U1", "  Ada@Example.COM ");
        assert_eq!(customer.normalized_email(), "ada@example.com");
    }
}
