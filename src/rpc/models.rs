//! JSON-RPC Models and Constants
//!
//! Envelope and parameter types for the data service's JSON-RPC surface.

use crate::backend::{CategoryId, OrderId, ProductId, ProductInput, UserRole};
use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// Constants
// =============================================================================

/// Header carrying the caller principal
pub const CALLER_HEADER: &str = "x-caller-principal";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const SERVICE_UNAVAILABLE: i32 = -32000;
pub const NOT_FOUND: i32 = -32001;
pub const UNAUTHORIZED: i32 = -32003;
pub const REJECTED: i32 = -32004;

// =============================================================================
// Protocol Models
// =============================================================================

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (should be "2.0")
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    pub params: Option<Value>,

    /// Request identifier
    pub id: Option<Value>,
}

// =============================================================================
// Method Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdParams {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIdParams {
    pub category_id: CategoryId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdParams {
    pub order_id: OrderId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductParams {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub input: ProductInput,
}

#[derive(Debug, Deserialize)]
pub struct CategoryNameParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryParams {
    pub category_id: CategoryId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleParams {
    pub user: String,
    pub role: UserRole,
}
