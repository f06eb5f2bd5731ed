//! Data Service Module
//!
//! This module defines the remote data service the storefront talks to:
//! - The `StoreBackend` contract (catalog reads, orders, admin mutations,
//!   roles and profiles)
//! - Wire models (Product, Category, Order, ...)
//! - An in-memory implementation backing the HTTP server and the tests

pub mod error;
pub mod helpers;
pub mod models;
pub mod state;

use async_trait::async_trait;

pub use error::StoreError;
pub use models::*;
pub use state::{InMemoryBackend, ServiceState, SharedState};

/// Operations exposed by the data service to one caller
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Categories and products in one consistent snapshot
    async fn get_catalog(&self) -> Result<Catalog, StoreError>;

    async fn get_product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Every product, cheapest first
    async fn list_products_sorted_by_price(&self) -> Result<Vec<Product>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, StoreError>;

    async fn create_order(&self, order: NewOrder) -> Result<OrderId, StoreError>;

    async fn get_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn create_product(&self, input: ProductInput) -> Result<ProductId, StoreError>;

    async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<(), StoreError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    async fn create_category(&self, name: String) -> Result<CategoryId, StoreError>;

    async fn update_category(&self, id: CategoryId, name: String) -> Result<(), StoreError>;

    async fn delete_category(&self, id: CategoryId) -> Result<(), StoreError>;

    async fn is_caller_admin(&self) -> Result<bool, StoreError>;

    async fn get_caller_user_role(&self) -> Result<UserRole, StoreError>;

    /// Grants `role` to `user`; admin only
    async fn assign_user_role(&self, user: String, role: UserRole) -> Result<(), StoreError>;

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, StoreError>;

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), StoreError>;

    /// Another principal's profile; only that principal or an admin may read it
    async fn get_user_profile(&self, user: String) -> Result<Option<UserProfile>, StoreError>;

    /// Populates the starter menu; refused once products exist
    async fn seed_default_products(&self) -> Result<(), StoreError>;
}
