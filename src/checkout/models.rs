//! Checkout Domain Models

use crate::backend::{NewOrder, OrderId, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Form
// =============================================================================

/// Contact and delivery details entered by the shopper
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Address,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Address => "delivery address",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("please fill in your {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Form values after trimming, guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
}

impl CheckoutForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: name.into(),
            customer_email: email.into(),
            customer_address: address.into(),
        }
    }

    /// Trims every field and reports all that are left empty.
    pub fn validate(&self) -> Result<ValidatedForm, ValidationError> {
        let name = self.customer_name.trim();
        let email = self.customer_email.trim();
        let address = self.customer_address.trim();

        let missing: Vec<Field> = [(Field::Name, name), (Field::Email, email), (Field::Address, address)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(ValidatedForm {
            customer_name: name.to_string(),
            customer_email: email.to_string(),
            customer_address: address.to_string(),
        })
    }
}

// =============================================================================
// Workflow State
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    /// Form editable; `last_error` holds the outcome of a failed attempt
    Idle { last_error: Option<CheckoutError> },
    /// Request in flight; the form is disabled
    Submitting { attempt: Uuid },
    Confirmed { order_id: OrderId },
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Idle { last_error: None }
    }
}

/// Whether the checkout view may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutGuard {
    Proceed,
    RedirectToCart,
}

/// An order ready to send, tagged with its attempt id for log correlation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub attempt: Uuid,
    pub order: NewOrder,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("your cart is empty")]
    EmptyCart,

    #[error("an order is already being placed")]
    AlreadySubmitting,

    #[error("this order has already been placed")]
    AlreadyConfirmed,

    /// The result belongs to an attempt that is no longer in flight
    #[error("this order attempt is no longer current")]
    StaleAttempt,

    #[error("could not place your order: {0}")]
    Remote(#[from] StoreError),
}

impl CheckoutError {
    /// True when resubmitting the same cart and form may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::Remote(_))
    }
}
