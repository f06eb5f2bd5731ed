//! JSON-RPC route handlers
//!
//! This module exposes the data service over JSON-RPC 2.0. It exports
//! `handle_method` publicly so the dispatch can be exercised without HTTP.

use super::{helpers::*, models::*};
use crate::backend::{Caller, NewOrder, ProductInput, SharedState, StoreBackend, UserProfile};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Creates routes for the JSON-RPC endpoint
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(handle_rpc))
        .route("/rpc", post(handle_rpc))
        .route("/rpc/", post(handle_rpc)) // Trailing slash safety
        .route("/health", get(handle_health))
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Endpoint: POST /rpc
/// Decodes the envelope, binds the caller and dispatches the method.
async fn handle_rpc(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<JsonRpcRequest>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => {
            warn!(error = %e.body_text(), "JSON parse error");
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc_error(Value::Null, PARSE_ERROR, "Parse error")),
            )
                .into_response();
        }
    };

    let caller = Caller::from_header(
        headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let backend = state.connect(caller);

    let id = req.id.unwrap_or(Value::Null);
    let params = req.params.unwrap_or(Value::Null);
    debug!(method = %req.method, caller = %backend.caller(), id = ?id, "RPC call");

    let response_body = match handle_method(&backend, &req.method, params).await {
        Ok(result) => rpc_success(id, result),
        Err(err) => err.into_envelope(id),
    };

    Json(response_body).into_response()
}

// =============================================================================
// Method Dispatch
// =============================================================================

/// Runs one service method against `backend` and encodes its result.
pub async fn handle_method(
    backend: &dyn StoreBackend,
    method: &str,
    params: Value,
) -> Result<Value, CallError> {
    let result = match method {
        "ping" => json!({}),
        "getCatalog" | "getProductCatalog" => json!(backend.get_catalog().await?),
        "getProductById" => {
            let p: ProductIdParams = parse_params(params)?;
            json!(backend.get_product_by_id(p.product_id).await?)
        }
        "listAllProducts" => json!(backend.list_products().await?),
        "listAllProductsSortedByPrice" => json!(backend.list_products_sorted_by_price().await?),
        "listAllCategories" => json!(backend.list_categories().await?),
        "listProductsByCategory" => {
            let p: CategoryIdParams = parse_params(params)?;
            json!(backend.list_products_by_category(p.category_id).await?)
        }
        "createOrder" => {
            let order: NewOrder = parse_params(params)?;
            json!(backend.create_order(order).await?)
        }
        "getOrderById" => {
            let p: OrderIdParams = parse_params(params)?;
            json!(backend.get_order_by_id(p.order_id).await?)
        }
        "listAllOrders" => json!(backend.list_orders().await?),
        "createProduct" => {
            let input: ProductInput = parse_params(params)?;
            json!(backend.create_product(input).await?)
        }
        "updateProduct" => {
            let p: UpdateProductParams = parse_params(params)?;
            backend.update_product(p.product_id, p.input).await?;
            Value::Null
        }
        "deleteProduct" => {
            let p: ProductIdParams = parse_params(params)?;
            backend.delete_product(p.product_id).await?;
            Value::Null
        }
        "createCategory" => {
            let p: CategoryNameParams = parse_params(params)?;
            json!(backend.create_category(p.name).await?)
        }
        "updateCategory" => {
            let p: UpdateCategoryParams = parse_params(params)?;
            backend.update_category(p.category_id, p.name).await?;
            Value::Null
        }
        "deleteCategory" => {
            let p: CategoryIdParams = parse_params(params)?;
            backend.delete_category(p.category_id).await?;
            Value::Null
        }
        "isCallerAdmin" => json!(backend.is_caller_admin().await?),
        "getCallerUserRole" => json!(backend.get_caller_user_role().await?),
        "assignCallerUserRole" => {
            let p: AssignRoleParams = parse_params(params)?;
            backend.assign_user_role(p.user, p.role).await?;
            Value::Null
        }
        "getCallerUserProfile" => json!(backend.get_caller_user_profile().await?),
        "saveCallerUserProfile" => {
            let profile: UserProfile = parse_params(params)?;
            backend.save_caller_user_profile(profile).await?;
            Value::Null
        }
        "getUserProfile" => {
            let p: UserParams = parse_params(params)?;
            json!(backend.get_user_profile(p.user).await?)
        }
        "adminSeedTestProducts" => {
            backend.seed_default_products().await?;
            Value::Null
        }
        _ => return Err(CallError::UnknownMethod(method.to_string())),
    };

    Ok(result)
}
