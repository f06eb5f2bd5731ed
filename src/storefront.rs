//! Storefront Application Context
//!
//! Bundles the cart, the shared catalog cache, catalog administration and the
//! checkout workflow for one shopper session. Built explicitly and handed to
//! the UI layer; there is no global instance.

use crate::backend::{OrderId, Product, StoreBackend};
use crate::cart::{CartStorage, CartStore};
use crate::catalog::{CatalogAdmin, CatalogConfig, CatalogQuery, CatalogView};
use crate::checkout::{CheckoutError, CheckoutForm, CheckoutWorkflow};
use std::sync::Arc;

pub struct Storefront {
    pub cart: CartStore,
    pub catalog: Arc<CatalogQuery>,
    pub admin: CatalogAdmin,
    pub checkout: CheckoutWorkflow,
}

impl Storefront {
    pub fn new(
        backend: Arc<dyn StoreBackend>,
        storage: Arc<dyn CartStorage>,
        catalog_config: CatalogConfig,
    ) -> Self {
        let catalog = Arc::new(CatalogQuery::new(Arc::clone(&backend), catalog_config));
        Self {
            cart: CartStore::open(storage),
            admin: CatalogAdmin::new(Arc::clone(&backend), Arc::clone(&catalog)),
            checkout: CheckoutWorkflow::new(backend),
            catalog,
        }
    }

    /// Opens a catalog view sharing this storefront's cache
    pub fn catalog_view(&self) -> CatalogView {
        CatalogView::mount(Arc::clone(&self.catalog))
    }

    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        self.cart.add_item(product, quantity);
    }

    pub async fn place_order(&mut self, form: &CheckoutForm) -> Result<OrderId, CheckoutError> {
        self.checkout.submit(&mut self.cart, form).await
    }
}
