//! Catalog Query Module
//!
//! This module keeps the storefront's view of the catalog consistent:
//! - A read-through cache with bounded retries and generation-based invalidation
//! - Admin mutations that invalidate the cache on success
//! - Per-view subscriptions with a stale-response guard
//! - Client-side category filtering

pub mod admin;
pub mod cache;
pub mod filter;
pub mod view;

pub use admin::CatalogAdmin;
pub use cache::{CatalogConfig, CatalogQuery};
pub use filter::filter_by_category;
pub use view::{CatalogView, LoadState};
