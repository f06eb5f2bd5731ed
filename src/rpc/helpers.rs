//! JSON-RPC Helpers
//!
//! Envelope construction and the mapping from service errors to RPC errors.

use super::models::*;
use crate::backend::StoreError;
use serde_json::{json, Value};
use tracing::warn;

/// Builds a JSON-RPC 2.0 success response.
///
/// # Arguments
///
/// * `id` – The request identifier that must be echoed back.
/// * `result` – The payload representing the successful outcome.
pub fn rpc_success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// Builds a JSON-RPC 2.0 error response.
///
/// # Arguments
///
/// * `id` – The request identifier (or `null` if unavailable).
/// * `code` – The JSON-RPC error code (e.g., -32601 for method not found).
/// * `message` – Human-readable description of the error.
pub fn rpc_error(id: Value, code: i32, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into(),
        }
    })
}

/// Error code reported for a service failure
pub fn error_code(err: &StoreError) -> i32 {
    match err {
        StoreError::Unavailable(_) => SERVICE_UNAVAILABLE,
        StoreError::NotFound { .. } => NOT_FOUND,
        StoreError::Unauthorized(_) => UNAUTHORIZED,
        StoreError::Invalid(_) => REJECTED,
    }
}

/// Errors a dispatched method can produce before or during the service call
#[derive(Debug)]
pub enum CallError {
    UnknownMethod(String),
    InvalidParams(String),
    Store(StoreError),
}

impl From<StoreError> for CallError {
    fn from(err: StoreError) -> Self {
        CallError::Store(err)
    }
}

impl CallError {
    pub fn into_envelope(self, id: Value) -> Value {
        match self {
            CallError::UnknownMethod(method) => {
                warn!(%method, "Unknown method");
                rpc_error(id, METHOD_NOT_FOUND, "Method not found")
            }
            CallError::InvalidParams(msg) => rpc_error(id, INVALID_PARAMS, msg),
            CallError::Store(err) => rpc_error(id, error_code(&err), err.to_string()),
        }
    }
}

/// Deserializes method params, treating a missing value as an empty object.
pub fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, CallError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| CallError::InvalidParams(format!("Invalid params: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_envelopes() {
        let success = rpc_success(json!(1), json!("ok"));
        assert_eq!(success["result"], "ok");
        assert_eq!(success["id"], 1);

        let error = rpc_error(json!(2), -1, "fail");
        assert_eq!(error["error"]["message"], "fail");
        assert_eq!(error["id"], 2);
    }

    #[test]
    fn test_store_errors_map_to_distinct_codes() {
        assert_eq!(
            error_code(&StoreError::Unavailable("down".into())),
            SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_code(&StoreError::NotFound {
                entity: "product",
                id: 1
            }),
            NOT_FOUND
        );
        assert_eq!(error_code(&StoreError::Unauthorized("x")), UNAUTHORIZED);
        assert_eq!(error_code(&StoreError::invalid("bad")), REJECTED);
    }

    #[test]
    fn test_null_params_parse_as_empty_object() {
        #[derive(serde::Deserialize)]
        struct Nothing {}
        assert!(parse_params::<Nothing>(Value::Null).is_ok());
        assert!(matches!(
            parse_params::<ProductIdParams>(Value::Null),
            Err(CallError::InvalidParams(_))
        ));
    }
}
