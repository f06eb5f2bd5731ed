//! Data Service Models
//!
//! Wire shapes shared by the data service, its JSON-RPC surface and the
//! storefront core. Every type serializes with camelCase field names so the
//! payloads match the generated client interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

pub type ProductId = u64;
pub type CategoryId = u64;
pub type OrderId = u64;

// =============================================================================
// Catalog Models
// =============================================================================

/// A sellable item as served by the data service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Categories and products captured in one atomic read
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Editable product fields, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl ProductInput {
    pub(crate) fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            available: self.available,
            image_url: self.image_url,
            category_id: self.category_id,
        }
    }
}

// =============================================================================
// Order Models
// =============================================================================

/// One ordered product with the unit price captured at submission time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: f64,
}

/// Payload of the order-creation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
}

/// Durable, immutable order record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Identity
// =============================================================================

/// Principal on whose behalf a backend handle issues calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Principal(String),
}

impl Caller {
    pub fn principal(id: impl Into<String>) -> Self {
        Caller::Principal(id.into())
    }

    /// Parses a header value; blank values are anonymous
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Caller::Principal(v.to_string()),
            _ => Caller::Anonymous,
        }
    }

    pub fn as_principal(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Principal(p) => Some(p),
        }
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caller::Anonymous => f.write_str("anonymous"),
            Caller::Principal(p) => f.write_str(p),
        }
    }
}

/// Access level of a principal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    /// Admins and users may keep a profile; guests may not
    pub fn is_registered(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::User)
    }
}

/// Self-service data a principal stores about itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
}
