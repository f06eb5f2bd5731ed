//! Category Filter
//!
//! Client-side narrowing of an already-loaded product list.

use crate::backend::{CategoryId, Product};

/// Products in `category`, or every product when `category` is `None`.
///
/// Pure projection over an already-fetched list; never calls the service.
pub fn filter_by_category(products: &[Product], category: Option<CategoryId>) -> Vec<Product> {
    match category {
        None => products.to_vec(),
        Some(id) => products
            .iter()
            .filter(|p| p.category_id == Some(id))
            .cloned()
            .collect(),
    }
}
