//! Storefront Library
//!
//! This library provides the core of a storefront: a persisted shopping cart,
//! a read-through catalog cache kept consistent with admin mutations, and the
//! order submission workflow. It also ships an in-memory data service with a
//! JSON-RPC surface.

// Domain modules
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod storefront;

// Data service
pub mod backend;
pub mod rpc;

// Infrastructure
pub mod config;
pub mod router;

pub use storefront::Storefront;
