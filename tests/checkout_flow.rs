//! End-to-end storefront scenarios against the in-memory data service
//!
//! These tests wire a `Storefront` the way a UI would and verify:
//! - The checkout happy path, validation block and failure/retry path
//! - Catalog freshness after admin mutations
//! - Cart persistence across a reload

use std::sync::Arc;
use std::time::Duration;

use storefront_rust::backend::{Caller, Product, ProductInput, ServiceState, StoreBackend};
use storefront_rust::cart::{CartStorage, FileStorage, MemoryStorage};
use storefront_rust::catalog::{CatalogConfig, LoadState};
use storefront_rust::checkout::{CheckoutError, CheckoutForm, CheckoutGuard, CheckoutState, Field};
use storefront_rust::Storefront;

const ADMIN: &str = "owner";

fn quick_catalog() -> CatalogConfig {
    CatalogConfig {
        retry_delay: Duration::ZERO,
        ..CatalogConfig::default()
    }
}

fn storefront(state: &Arc<ServiceState>, caller: Caller, storage: Arc<dyn CartStorage>) -> Storefront {
    Storefront::new(Arc::new(state.connect(caller)), storage, quick_catalog())
}

fn tea() -> Product {
    Product {
        id: 1,
        name: "Tea".into(),
        description: String::new(),
        price: 50.0,
        available: true,
        image_url: String::new(),
        category_id: None,
    }
}

fn asha() -> CheckoutForm {
    CheckoutForm::new("Asha", "a@x.com", "12 MG Road")
}

#[tokio::test]
async fn test_checkout_happy_path() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let mut shop = storefront(&state, Caller::Anonymous, Arc::new(MemoryStorage::new()));
    shop.add_to_cart(&tea(), 2);

    let order_id = shop.place_order(&asha()).await.expect("order should be placed");

    // 1. Cart is consumed and the confirmation holds the service's id
    assert!(shop.cart.is_empty());
    assert_eq!(
        shop.checkout.state(),
        &CheckoutState::Confirmed { order_id }
    );

    // 2. The service recorded exactly the cart snapshot
    let admin = state.connect(Caller::principal(ADMIN));
    let order = admin.get_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_id, 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].price, 50.0);
    assert_eq!(order.total_amount, 100.0);
    assert_eq!(order.customer_name, "Asha");
}

#[tokio::test]
async fn test_blank_email_blocks_submission() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let mut shop = storefront(&state, Caller::Anonymous, Arc::new(MemoryStorage::new()));
    shop.add_to_cart(&tea(), 2);

    let err = shop
        .place_order(&CheckoutForm::new("Asha", "  ", "12 MG Road"))
        .await
        .unwrap_err();

    match &err {
        CheckoutError::Validation(v) => assert_eq!(v.missing, vec![Field::Email]),
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(!err.to_string().is_empty(), "message is shown inline");
    assert_eq!(state.order_count(), 0, "service must not be called");
    assert_eq!(shop.cart.total_items(), 2);
}

#[tokio::test]
async fn test_failed_submission_keeps_cart_for_retry() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let mut shop = storefront(&state, Caller::Anonymous, Arc::new(MemoryStorage::new()));
    shop.add_to_cart(&tea(), 2);
    state.fail_next(1);

    let err = shop.place_order(&asha()).await.unwrap_err();

    assert!(err.is_retryable(), "failure should offer a retry");
    assert_eq!(shop.cart.items().len(), 1);
    assert_eq!(shop.cart.line(1).unwrap().quantity, 2);
    assert!(!shop.checkout.is_submitting());

    let order_id = shop.place_order(&asha()).await.expect("retry should succeed");
    assert_eq!(order_id, 1, "the failed attempt consumed no order id");
}

#[tokio::test]
async fn test_checkout_guard_redirects_empty_cart() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let shop = storefront(&state, Caller::Anonymous, Arc::new(MemoryStorage::new()));

    assert_eq!(shop.checkout.guard(&shop.cart), CheckoutGuard::RedirectToCart);
}

#[tokio::test]
async fn test_admin_mutation_is_visible_to_next_catalog_read() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let shop = storefront(&state, Caller::principal(ADMIN), Arc::new(MemoryStorage::new()));
    shop.admin.seed_default_products().await.unwrap();

    let before = shop.catalog.get_catalog().await.unwrap();
    let target = before.products[0].clone();

    shop.admin
        .update_product(
            target.id,
            ProductInput {
                name: target.name.clone(),
                description: target.description.clone(),
                price: target.price + 10.0,
                image_url: target.image_url.clone(),
                available: target.available,
                category_id: target.category_id,
            },
        )
        .await
        .unwrap();
    let after = shop.catalog.get_catalog().await.unwrap();
    assert_ne!(after.product(target.id), before.product(target.id));

    let renamed = before.categories[0].clone();
    shop.admin.update_category(renamed.id, "Hot Drinks").await.unwrap();
    let after = shop.catalog.get_catalog().await.unwrap();
    assert_eq!(after.category(renamed.id).unwrap().name, "Hot Drinks");
}

#[tokio::test]
async fn test_catalog_view_and_cart_snapshot_price() {
    let state = Arc::new(ServiceState::new([ADMIN]));
    let mut shop = storefront(&state, Caller::principal(ADMIN), Arc::new(MemoryStorage::new()));
    shop.admin.seed_default_products().await.unwrap();

    let mut view = shop.catalog_view();
    let LoadState::Ready(catalog) = view.settled().await else {
        panic!("catalog should load");
    };
    let chai = catalog.products[0].clone();
    shop.add_to_cart(&chai, 1);

    // Price rises after the shopper added the item
    shop.admin
        .update_product(
            chai.id,
            ProductInput {
                name: chai.name.clone(),
                description: chai.description.clone(),
                price: chai.price * 2.0,
                image_url: chai.image_url.clone(),
                available: true,
                category_id: chai.category_id,
            },
        )
        .await
        .unwrap();

    let order_id = shop.place_order(&asha()).await.unwrap();
    let admin = state.connect(Caller::principal(ADMIN));
    let order = admin.get_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.items[0].price, chai.price, "order uses the cart snapshot price");
}

#[tokio::test]
async fn test_cart_survives_reload_from_file_storage() {
    let dir = std::env::temp_dir().join(format!("storefront-it-{}", uuid::Uuid::new_v4().simple()));
    let state = Arc::new(ServiceState::new([ADMIN]));

    {
        let mut shop = storefront(&state, Caller::Anonymous, Arc::new(FileStorage::new(&dir)));
        shop.add_to_cart(&tea(), 2);
        shop.cart.update_quantity(1, 3);
    }

    let reloaded = storefront(&state, Caller::Anonymous, Arc::new(FileStorage::new(&dir)));
    assert_eq!(reloaded.cart.total_items(), 3);
    assert_eq!(reloaded.cart.total_amount(), 150.0);

    let _ = std::fs::remove_dir_all(dir);
}
