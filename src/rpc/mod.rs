//! JSON-RPC Module
//!
//! This module contains the HTTP surface of the data service, including:
//! - Protocol models (JsonRpcRequest, error codes, method params)
//! - RPC helpers (success/error envelopes, error-code mapping)
//! - Handlers (envelope decoding, caller binding, method dispatch)

pub mod handlers;
pub mod helpers;
pub mod models;

// Re-export commonly used types and functions
pub use handlers::{handle_method, routes};
