//! Shopping Cart Domain Module
//!
//! This module contains the shopper's cart, including:
//! - Domain models (CartLine, persisted snapshot layout)
//! - Durable storage backends (file, memory)
//! - The cart store (mutations, derived totals, persistence)

pub mod models;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use models::CartLine;
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, CART_STORAGE_KEY};
