//! Catalog Administration
//!
//! Wraps the data service's catalog mutations. Each successful mutation
//! invalidates the shared `CatalogQuery` before returning, so no caller can
//! observe success and then read the pre-mutation catalog from the cache.
//! Mutations are never retried.

use super::cache::CatalogQuery;
use crate::backend::{CategoryId, ProductId, ProductInput, StoreBackend, StoreError};
use std::sync::Arc;
use tracing::info;

pub struct CatalogAdmin {
    backend: Arc<dyn StoreBackend>,
    query: Arc<CatalogQuery>,
}

impl CatalogAdmin {
    pub fn new(backend: Arc<dyn StoreBackend>, query: Arc<CatalogQuery>) -> Self {
        Self { backend, query }
    }

    pub async fn is_caller_admin(&self) -> Result<bool, StoreError> {
        self.backend.is_caller_admin().await
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<ProductId, StoreError> {
        let id = self.backend.create_product(input).await?;
        self.invalidate("create product");
        Ok(id)
    }

    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<(), StoreError> {
        self.backend.update_product(id, input).await?;
        self.invalidate("update product");
        Ok(())
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        self.backend.delete_product(id).await?;
        self.invalidate("delete product");
        Ok(())
    }

    pub async fn create_category(&self, name: impl Into<String>) -> Result<CategoryId, StoreError> {
        let id = self.backend.create_category(name.into()).await?;
        self.invalidate("create category");
        Ok(id)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.backend.update_category(id, name.into()).await?;
        self.invalidate("update category");
        Ok(())
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), StoreError> {
        self.backend.delete_category(id).await?;
        self.invalidate("delete category");
        Ok(())
    }

    pub async fn seed_default_products(&self) -> Result<(), StoreError> {
        self.backend.seed_default_products().await?;
        self.invalidate("seed products");
        Ok(())
    }

    fn invalidate(&self, action: &'static str) {
        info!(action, "Catalog changed");
        self.query.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Caller, ServiceState};
    use crate::catalog::cache::CatalogConfig;

    fn setup(caller: Caller) -> (Arc<ServiceState>, Arc<CatalogQuery>, CatalogAdmin) {
        let state = Arc::new(ServiceState::new(["owner"]));
        let backend: Arc<dyn StoreBackend> = Arc::new(state.connect(caller));
        let query = Arc::new(CatalogQuery::new(backend.clone(), CatalogConfig::default()));
        let admin = CatalogAdmin::new(backend, query.clone());
        (state, query, admin)
    }

    fn input(name: &str, price: f64) -> ProductInput {
        ProductInput {
            name: name.into(),
            description: String::new(),
            price,
            image_url: String::new(),
            available: true,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_mutations_are_visible_to_next_read() {
        let (_, query, admin) = setup(Caller::principal("owner"));
        let id = admin.create_product(input("Tea", 50.0)).await.unwrap();
        let before = query.get_catalog().await.unwrap();

        admin.update_product(id, input("Tea", 65.0)).await.unwrap();
        let after = query.get_catalog().await.unwrap();

        assert_eq!(before.product(id).unwrap().price, 50.0);
        assert_eq!(after.product(id).unwrap().price, 65.0);

        let drinks = admin.create_category("Drinks").await.unwrap();
        let with_category = query.get_catalog().await.unwrap();
        assert!(with_category.category(drinks).is_some());

        admin.delete_product(id).await.unwrap();
        assert!(query.get_catalog().await.unwrap().product(id).is_none());
    }

    #[tokio::test]
    async fn test_rejected_mutation_keeps_cache() {
        let (state, query, admin) = setup(Caller::principal("owner"));
        query.get_catalog().await.unwrap();

        let err = admin.delete_category(404).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(query.cached().is_some(), "failed mutations must not invalidate");
        assert_eq!(state.catalog_reads(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_mutation_is_rejected() {
        let (_, _, admin) = setup(Caller::Anonymous);

        assert!(!admin.is_caller_admin().await.unwrap());
        assert!(matches!(
            admin.create_category("Drinks").await,
            Err(StoreError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_mutations_are_not_retried() {
        let (state, _, admin) = setup(Caller::principal("owner"));
        state.fail_next(1);

        let err = admin.create_category("Drinks").await.unwrap_err();

        assert!(err.is_transient());
        assert!(admin.backend.list_categories().await.unwrap().is_empty());
    }
}
