//! Checkout Module
//!
//! This module turns the cart into an order:
//! - Form validation (trimmed, non-empty contact and delivery fields)
//! - The submission state machine and the empty-cart guard

pub mod models;
pub mod workflow;

pub use models::{
    CheckoutError, CheckoutForm, CheckoutGuard, CheckoutState, Field, PendingOrder,
    ValidationError,
};
pub use workflow::CheckoutWorkflow;
