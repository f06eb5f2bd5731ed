//! Data Service Errors

use thiserror::Error;

/// Failure reported by the data service
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Transport or service failure; the call may succeed if repeated
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("caller is not authorized to {0}")]
    Unauthorized(&'static str),

    /// The service refused the request as malformed
    #[error("request rejected: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::Invalid(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
