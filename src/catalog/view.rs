//! Catalog View
//!
//! Per-view subscription to the catalog. Loads run on the tokio runtime and
//! publish `LoadState` through a watch channel. A load only lands if the view
//! is still alive and no newer refresh was issued after it started.

use super::{cache::CatalogQuery, filter::filter_by_category};
use crate::backend::{Catalog, CategoryId, Product, StoreError};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Weak,
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<Catalog>),
    /// The fetch failed after retries; `CatalogView::refresh` tries again
    Failed(StoreError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Load results flow through here; requests are numbered so late answers to
/// superseded requests are dropped.
struct Publisher {
    tx: watch::Sender<LoadState>,
    latest: AtomicU64,
}

impl Publisher {
    fn begin(&self) -> u64 {
        let mut request = 0;
        self.tx.send_modify(|state| {
            request = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoadState::Loading;
        });
        request
    }

    fn complete(&self, request: u64, result: Result<Arc<Catalog>, StoreError>) -> bool {
        self.tx.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != request {
                debug!(request, "Dropping superseded catalog load");
                return false;
            }
            *state = match result {
                Ok(catalog) => LoadState::Ready(catalog),
                Err(err) => LoadState::Failed(err),
            };
            true
        })
    }
}

pub struct CatalogView {
    query: Arc<CatalogQuery>,
    publisher: Arc<Publisher>,
    receiver: watch::Receiver<LoadState>,
    selected_category: Option<CategoryId>,
}

impl CatalogView {
    /// Creates the view and starts the first load.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(query: Arc<CatalogQuery>) -> Self {
        let (tx, receiver) = watch::channel(LoadState::Loading);
        let view = Self {
            query,
            publisher: Arc::new(Publisher {
                tx,
                latest: AtomicU64::new(0),
            }),
            receiver,
            selected_category: None,
        };
        view.refresh();
        view
    }

    /// Starts a new load, superseding any load still in flight.
    pub fn refresh(&self) {
        let request = self.publisher.begin();
        let query = Arc::clone(&self.query);
        let publisher: Weak<Publisher> = Arc::downgrade(&self.publisher);

        tokio::spawn(async move {
            let result = query.get_catalog().await;
            match publisher.upgrade() {
                Some(publisher) => {
                    publisher.complete(request, result);
                }
                None => debug!(request, "Catalog view gone, dropping load"),
            }
        });
    }

    pub fn state(&self) -> LoadState {
        self.receiver.borrow().clone()
    }

    /// Receiver for callers that render on every state change
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.receiver.clone()
    }

    /// Waits until the current load has finished and returns its outcome.
    pub async fn settled(&mut self) -> LoadState {
        loop {
            let state = self.receiver.borrow_and_update().clone();
            if !state.is_loading() {
                return state;
            }
            // The view owns the sender, so the channel cannot close here.
            if self.receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn select_category(&mut self, category: Option<CategoryId>) {
        self.selected_category = category;
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.selected_category
    }

    /// Products of the loaded catalog matching the selected category
    pub fn visible_products(&self) -> Vec<Product> {
        match &*self.receiver.borrow() {
            LoadState::Ready(catalog) => filter_by_category(&catalog.products, self.selected_category),
            _ => Vec::new(),
        }
    }
}
