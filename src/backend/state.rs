//! Data Service State Management
//!
//! In-memory implementation of the data service. One `ServiceState` is shared
//! by every connection; `connect` hands out a `StoreBackend` handle bound to a
//! caller so admin-only operations can be authorized. Roles start from the
//! configured admin roster and can be reassigned at runtime by an admin.

use super::{error::StoreError, helpers::*, models::*, StoreBackend};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, AtomicU64, Ordering},
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};
use tracing::{debug, info, warn};

// =============================================================================
// Application State
// =============================================================================

/// Shared service state that can be safely passed between threads
pub type SharedState = Arc<ServiceState>;

/// Products and categories live under one lock so catalog reads are atomic.
#[derive(Default)]
struct CatalogTables {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
}

/// Core service state containing the catalog, orders, roles and profiles
pub struct ServiceState {
    catalog: RwLock<CatalogTables>,

    /// Orders keyed by identifier.
    /// DashMap allows concurrent access without external Mutexes.
    orders: DashMap<OrderId, Order>,

    next_product_id: AtomicU64,
    next_category_id: AtomicU64,
    next_order_id: AtomicU64,

    /// Explicit role grants; principals without one are plain users
    roles: DashMap<String, UserRole>,
    profiles: DashMap<String, UserProfile>,

    /// Remaining calls to fail with `Unavailable`, for exercising client retries
    pending_failures: AtomicU32,
    catalog_reads: AtomicU64,
}

impl ServiceState {
    /// Creates an empty service whose admin roster is `admins`
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: DashMap<String, UserRole> = admins
            .into_iter()
            .map(|p| (p.into(), UserRole::Admin))
            .collect();
        info!(admins = roles.len(), "Data service initialized");

        Self {
            catalog: RwLock::new(CatalogTables::default()),
            orders: DashMap::new(),
            next_product_id: AtomicU64::new(1),
            next_category_id: AtomicU64::new(1),
            next_order_id: AtomicU64::new(1),
            roles,
            profiles: DashMap::new(),
            pending_failures: AtomicU32::new(0),
            catalog_reads: AtomicU64::new(0),
        }
    }

    /// Returns a backend handle acting on behalf of `caller`
    pub fn connect(self: &Arc<Self>, caller: Caller) -> InMemoryBackend {
        InMemoryBackend {
            state: Arc::clone(self),
            caller,
        }
    }

    /// Anonymous callers are guests; known principals default to `User`
    pub fn role_of(&self, caller: &Caller) -> UserRole {
        match caller.as_principal() {
            None => UserRole::Guest,
            Some(p) => self.roles.get(p).map_or(UserRole::User, |r| *r.value()),
        }
    }

    pub fn is_admin(&self, caller: &Caller) -> bool {
        self.role_of(caller) == UserRole::Admin
    }

    /// Makes the next `count` calls fail as if the service were unreachable
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of catalog snapshots served so far
    pub fn catalog_reads(&self) -> u64 {
        self.catalog_reads.load(Ordering::SeqCst)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    fn read_catalog(&self) -> RwLockReadGuard<'_, CatalogTables> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_catalog(&self) -> RwLockWriteGuard<'_, CatalogTables> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        let consumed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match consumed {
            Ok(_) => Err(StoreError::Unavailable("injected outage".into())),
            Err(_) => Ok(()),
        }
    }

    fn insert_category(tables: &mut CatalogTables, id: CategoryId, name: String) {
        tables.categories.insert(id, Category { id, name });
    }
}

// =============================================================================
// Backend Handle
// =============================================================================

/// `StoreBackend` implementation over a shared `ServiceState`
#[derive(Clone)]
pub struct InMemoryBackend {
    state: SharedState,
    caller: Caller,
}

impl InMemoryBackend {
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    fn require_admin(&self, action: &'static str) -> Result<(), StoreError> {
        if self.state.is_admin(&self.caller) {
            Ok(())
        } else {
            warn!(caller = %self.caller, action, "Rejected non-admin call");
            Err(StoreError::Unauthorized(action))
        }
    }

    /// Returns the caller's principal if its role may keep a profile
    fn require_registered(&self, action: &'static str) -> Result<&str, StoreError> {
        match self.caller.as_principal() {
            Some(p) if self.state.role_of(&self.caller).is_registered() => Ok(p),
            _ => {
                warn!(caller = %self.caller, action, "Rejected unregistered call");
                Err(StoreError::Unauthorized(action))
            }
        }
    }

    fn check_category(
        tables: &CatalogTables,
        category_id: Option<CategoryId>,
    ) -> Result<(), StoreError> {
        match category_id {
            Some(id) if !tables.categories.contains_key(&id) => Err(StoreError::NotFound {
                entity: "category",
                id,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    async fn get_catalog(&self) -> Result<Catalog, StoreError> {
        self.state.check_available()?;
        let tables = self.state.read_catalog();
        self.state.catalog_reads.fetch_add(1, Ordering::SeqCst);

        Ok(Catalog {
            categories: tables.categories.values().cloned().collect(),
            products: tables.products.values().cloned().collect(),
        })
    }

    async fn get_product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.state.check_available()?;
        Ok(self.state.read_catalog().products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.state.check_available()?;
        Ok(self.state.read_catalog().products.values().cloned().collect())
    }

    async fn list_products_sorted_by_price(&self) -> Result<Vec<Product>, StoreError> {
        self.state.check_available()?;
        let mut products: Vec<Product> =
            self.state.read_catalog().products.values().cloned().collect();
        sort_by_price(&mut products);
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.state.check_available()?;
        Ok(self.state.read_catalog().categories.values().cloned().collect())
    }

    async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, StoreError> {
        self.state.check_available()?;
        Ok(self
            .state
            .read_catalog()
            .products
            .values()
            .filter(|p| p.category_id == Some(category_id))
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        self.state.check_available()?;
        validate_new_order(&order)?;

        let items_total = order_items_total(&order.items);
        if (items_total - order.total_amount).abs() > 0.005 {
            warn!(
                submitted = order.total_amount,
                computed = items_total,
                "Order total differs from its items"
            );
        }

        let id = self.state.next_order_id.fetch_add(1, Ordering::SeqCst);
        let record = Order {
            id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_address: order.customer_address,
            items: order.items,
            total_amount: order.total_amount,
            timestamp: Utc::now(),
        };
        info!(
            order_id = id,
            items = record.items.len(),
            total = record.total_amount,
            "Order created"
        );
        self.state.orders.insert(id, record);
        Ok(id)
    }

    async fn get_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.state.check_available()?;
        self.require_admin("view orders")?;
        Ok(self.state.orders.get(&id).map(|o| o.value().clone()))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.state.check_available()?;
        self.require_admin("view orders")?;

        let mut orders: Vec<Order> = self
            .state
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    async fn create_product(&self, input: ProductInput) -> Result<ProductId, StoreError> {
        self.state.check_available()?;
        self.require_admin("create products")?;
        validate_product_input(&input)?;

        let mut tables = self.state.write_catalog();
        Self::check_category(&tables, input.category_id)?;

        let id = self.state.next_product_id.fetch_add(1, Ordering::SeqCst);
        tables.products.insert(id, input.into_product(id));
        debug!(product_id = id, "Product created");
        Ok(id)
    }

    async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("update products")?;
        validate_product_input(&input)?;

        let mut tables = self.state.write_catalog();
        if !tables.products.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "product",
                id,
            });
        }
        Self::check_category(&tables, input.category_id)?;
        tables.products.insert(id, input.into_product(id));
        debug!(product_id = id, "Product updated");
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("delete products")?;

        match self.state.write_catalog().products.remove(&id) {
            Some(_) => {
                debug!(product_id = id, "Product deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "product",
                id,
            }),
        }
    }

    async fn create_category(&self, name: String) -> Result<CategoryId, StoreError> {
        self.state.check_available()?;
        self.require_admin("create categories")?;
        validate_category_name(&name)?;

        let id = self.state.next_category_id.fetch_add(1, Ordering::SeqCst);
        ServiceState::insert_category(&mut self.state.write_catalog(), id, name);
        debug!(category_id = id, "Category created");
        Ok(id)
    }

    async fn update_category(&self, id: CategoryId, name: String) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("update categories")?;
        validate_category_name(&name)?;

        let mut tables = self.state.write_catalog();
        match tables.categories.get_mut(&id) {
            Some(category) => {
                category.name = name;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "category",
                id,
            }),
        }
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("delete categories")?;

        let mut tables = self.state.write_catalog();
        if tables.categories.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "category",
                id,
            });
        }

        // Detach products so no snapshot references a missing category.
        let mut detached = 0;
        for product in tables.products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
                detached += 1;
            }
        }
        debug!(category_id = id, detached, "Category deleted");
        Ok(())
    }

    async fn is_caller_admin(&self) -> Result<bool, StoreError> {
        self.state.check_available()?;
        Ok(self.state.is_admin(&self.caller))
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, StoreError> {
        self.state.check_available()?;
        Ok(self.state.role_of(&self.caller))
    }

    async fn assign_user_role(&self, user: String, role: UserRole) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("assign roles")?;

        let user = user.trim();
        if user.is_empty() {
            return Err(StoreError::invalid("user principal must not be empty"));
        }
        info!(caller = %self.caller, user, ?role, "Role assigned");
        self.state.roles.insert(user.to_string(), role);
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, StoreError> {
        self.state.check_available()?;
        let principal = self.require_registered("view profiles")?;
        Ok(self.state.profiles.get(principal).map(|p| p.value().clone()))
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        self.state.check_available()?;
        let principal = self.require_registered("save profiles")?;
        validate_profile(&profile)?;

        self.state.profiles.insert(principal.to_string(), profile);
        debug!(caller = %self.caller, "Profile saved");
        Ok(())
    }

    async fn get_user_profile(&self, user: String) -> Result<Option<UserProfile>, StoreError> {
        self.state.check_available()?;
        if self.caller.as_principal() != Some(user.as_str()) {
            self.require_admin("view other profiles")?;
        }
        Ok(self.state.profiles.get(&user).map(|p| p.value().clone()))
    }

    async fn seed_default_products(&self) -> Result<(), StoreError> {
        self.state.check_available()?;
        self.require_admin("seed products")?;

        let mut tables = self.state.write_catalog();
        if !tables.products.is_empty() {
            return Err(StoreError::invalid("products already exist"));
        }

        for (category_name, entries) in default_menu() {
            let category_id = self.state.next_category_id.fetch_add(1, Ordering::SeqCst);
            ServiceState::insert_category(&mut tables, category_id, category_name.to_string());

            for (name, description, price) in entries {
                let id = self.state.next_product_id.fetch_add(1, Ordering::SeqCst);
                tables.products.insert(
                    id,
                    Product {
                        id,
                        name: name.to_string(),
                        description: description.to_string(),
                        price,
                        available: true,
                        image_url: String::new(),
                        category_id: Some(category_id),
                    },
                );
            }
        }
        info!(products = tables.products.len(), "Seeded default menu");
        Ok(())
    }
}
