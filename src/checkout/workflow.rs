//! Order Submission Workflow
//!
//! Drives `Idle -> Submitting -> Confirmed`, falling back to `Idle` with the
//! error recorded when the service rejects the order. The cart is cleared
//! only after a confirmed order; a failed attempt leaves it untouched.
//!
//! Attempts are not deduplicated: the attempt id only tags log lines, and the
//! service alone decides order-id uniqueness.

use super::models::*;
use crate::backend::{NewOrder, OrderId, StoreBackend, StoreError};
use crate::cart::CartStore;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub struct CheckoutWorkflow {
    backend: Arc<dyn StoreBackend>,
    state: CheckoutState,
}

impl CheckoutWorkflow {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            state: CheckoutState::default(),
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, CheckoutState::Submitting { .. })
    }

    pub fn confirmed_order(&self) -> Option<OrderId> {
        match self.state {
            CheckoutState::Confirmed { order_id } => Some(order_id),
            _ => None,
        }
    }

    /// Decides whether the checkout view may be shown for `cart`.
    ///
    /// An empty cart with no order confirmed in this view sends the shopper
    /// away instead of letting them submit an empty order.
    pub fn guard(&self, cart: &CartStore) -> CheckoutGuard {
        if cart.is_empty() && self.confirmed_order().is_none() {
            CheckoutGuard::RedirectToCart
        } else {
            CheckoutGuard::Proceed
        }
    }

    /// Validates the form and builds the order from the cart's snapshot
    /// prices, moving to `Submitting`. Nothing is sent yet.
    pub fn begin(&mut self, cart: &CartStore, form: &CheckoutForm) -> Result<PendingOrder, CheckoutError> {
        match self.state {
            CheckoutState::Submitting { .. } => return Err(CheckoutError::AlreadySubmitting),
            CheckoutState::Confirmed { .. } => return Err(CheckoutError::AlreadyConfirmed),
            CheckoutState::Idle { .. } => {}
        }

        let form = match form.validate() {
            Ok(form) => form,
            Err(err) => return Err(self.reject(err.into())),
        };
        if cart.is_empty() {
            return Err(self.reject(CheckoutError::EmptyCart));
        }

        let attempt = Uuid::new_v4();
        let order = NewOrder {
            items: cart.order_items(),
            total_amount: cart.total_amount(),
            customer_name: form.customer_name,
            customer_email: form.customer_email,
            customer_address: form.customer_address,
        };
        self.state = CheckoutState::Submitting { attempt };
        info!(%attempt, items = order.items.len(), total = order.total_amount, "Submitting order");

        Ok(PendingOrder { attempt, order })
    }

    /// Applies the service's answer to an attempt started with `begin`.
    ///
    /// Only the attempt currently in flight is accepted. Answers for any other
    /// attempt, or a second answer for the same one, leave the state and the
    /// cart untouched.
    pub fn finish(
        &mut self,
        cart: &mut CartStore,
        pending: &PendingOrder,
        result: Result<OrderId, StoreError>,
    ) -> Result<OrderId, CheckoutError> {
        match self.state {
            CheckoutState::Submitting { attempt } if attempt == pending.attempt => {}
            _ => {
                warn!(
                    attempt = %pending.attempt,
                    state = ?self.state,
                    "Ignoring result for an attempt not in flight"
                );
                return Err(CheckoutError::StaleAttempt);
            }
        }

        match result {
            Ok(order_id) => {
                info!(attempt = %pending.attempt, order_id, "Order confirmed");
                cart.clear_cart();
                self.state = CheckoutState::Confirmed { order_id };
                Ok(order_id)
            }
            Err(err) => {
                error!(attempt = %pending.attempt, error = %err, "Order submission failed");
                Err(self.reject(CheckoutError::Remote(err)))
            }
        }
    }

    /// Validates, sends the order and applies the outcome.
    pub async fn submit(&mut self, cart: &mut CartStore, form: &CheckoutForm) -> Result<OrderId, CheckoutError> {
        let pending = self.begin(cart, form)?;
        let span = info_span!("checkout", attempt = %pending.attempt);
        let result = self
            .backend
            .create_order(pending.order.clone())
            .instrument(span)
            .await;
        self.finish(cart, &pending, result)
    }

    /// Returns a confirmed workflow to `Idle` so a new checkout can start.
    pub fn reset(&mut self) {
        self.state = CheckoutState::default();
    }

    fn reject(&mut self, err: CheckoutError) -> CheckoutError {
        if !err.is_retryable() {
            warn!(error = %err, "Checkout blocked");
        }
        self.state = CheckoutState::Idle {
            last_error: Some(err.clone()),
        };
        err
    }
}
