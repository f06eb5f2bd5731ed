//! Shopping Cart Domain Models
//!
//! This module contains the cart line type and the persisted cart layout.

use crate::backend::{OrderItem, Product};
use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Returns the default quantity (1) for cart lines
fn default_quantity() -> u32 {
    1
}

/// One product in the cart.
///
/// `product` is the catalog entry as it was when the line was added; later
/// catalog price changes do not reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: Product,

    /// Always at least 1 while the line exists
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }

    /// The order entry for this line, priced from the snapshot.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product.id,
            quantity: self.quantity,
            price: self.product.price,
        }
    }
}

// =============================================================================
// Persisted Layout
// =============================================================================

/// Version written by this build
pub const CART_SNAPSHOT_VERSION: u32 = 1;

/// Versioned on-disk form of the cart, as read back
#[derive(Debug, Deserialize)]
pub struct CartSnapshot {
    pub version: u32,
    pub items: Vec<CartLine>,
}

/// Versioned on-disk form of the cart, as written
#[derive(Debug, Serialize)]
pub struct CartSnapshotRef<'a> {
    pub version: u32,
    pub items: &'a [CartLine],
}

/// Every layout ever written under the cart key.
///
/// The unversioned layout is a bare array of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredCart {
    Versioned(CartSnapshot),
    Legacy(Vec<CartLine>),
}
