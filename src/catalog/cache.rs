//! Catalog Read-Through Cache
//!
//! `CatalogQuery` serves the combined categories+products snapshot, fetching
//! from the data service on a miss and retrying failed reads a bounded number
//! of times. Admin mutations invalidate it wholesale.

use crate::backend::{Catalog, StoreBackend, StoreError};
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Fetch and staleness policy for `CatalogQuery`
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Extra attempts after the first failed fetch
    pub retries: u32,
    /// Delay before retry `n` is `retry_delay * n`
    pub retry_delay: Duration,
    /// Cached snapshots older than this are fetched again
    pub stale_after: Option<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            retry_delay: Duration::from_millis(250),
            stale_after: None,
        }
    }
}

#[derive(Default)]
struct CacheSlot {
    generation: u64,
    entry: Option<(Arc<Catalog>, Instant)>,
}

pub struct CatalogQuery {
    backend: Arc<dyn StoreBackend>,
    config: CatalogConfig,
    slot: RwLock<CacheSlot>,
}

impl CatalogQuery {
    pub fn new(backend: Arc<dyn StoreBackend>, config: CatalogConfig) -> Self {
        Self {
            backend,
            config,
            slot: RwLock::new(CacheSlot::default()),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the cached catalog, or fetches it on a miss.
    ///
    /// A fetch that overlaps an invalidation still returns its result to this
    /// caller but is not installed, so the next read goes to the service.
    pub async fn get_catalog(&self) -> Result<Arc<Catalog>, StoreError> {
        let generation = {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(catalog) = self.fresh_entry(&slot) {
                debug!("Catalog cache hit");
                return Ok(catalog);
            }
            slot.generation
        };

        let catalog = Arc::new(self.fetch_with_retry().await?);

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.entry = Some((Arc::clone(&catalog), Instant::now()));
        } else {
            debug!(
                started = generation,
                current = slot.generation,
                "Catalog invalidated during fetch, not caching"
            );
        }
        Ok(catalog)
    }

    /// Drops the cached catalog; the next read fetches from the service.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.entry = None;
        debug!(generation = slot.generation, "Catalog invalidated");
    }

    /// Cached snapshot without touching the service, if one is held
    pub fn cached(&self) -> Option<Arc<Catalog>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        self.fresh_entry(&slot)
    }

    fn fresh_entry(&self, slot: &CacheSlot) -> Option<Arc<Catalog>> {
        let (catalog, fetched_at) = slot.entry.as_ref()?;
        match self.config.stale_after {
            Some(max_age) if fetched_at.elapsed() >= max_age => None,
            _ => Some(Arc::clone(catalog)),
        }
    }

    async fn fetch_with_retry(&self) -> Result<Catalog, StoreError> {
        let mut attempt = 0;
        loop {
            match self.backend.get_catalog().await {
                Ok(catalog) => {
                    info!(
                        categories = catalog.categories.len(),
                        products = catalog.products.len(),
                        "Catalog loaded"
                    );
                    return Ok(catalog);
                }
                Err(err) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!(error = %err, attempt, "Catalog fetch failed, retrying");
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                }
                Err(err) => {
                    warn!(error = %err, "Catalog fetch failed, giving up");
                    return Err(err);
                }
            }
        }
    }
}
