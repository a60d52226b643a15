use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, ensure_id, ValidatedJson, ValidatedPath};
use crate::handlers::AppState;
use crate::services::orders::{CreateOrderRequest, OrderView};

#[utoipa::path(
    get,
    path = "/order",
    summary = "List orders",
    responses(
        (status = 200, description = "All orders with their items and address snapshots", body = [OrderView]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>, ServiceError> {
    Ok(Json(state.services.orders.list().await?))
}

#[utoipa::path(
    get,
    path = "/order/{id}",
    summary = "Get order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderView),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<OrderView>, ServiceError> {
    let id = ensure_id(id, "Order")?;
    Ok(Json(state.services.orders.get(id).await?))
}

/// Snapshots the client's addresses and the requested inventories into a new order.
#[utoipa::path(
    post,
    path = "/order",
    summary = "Create order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderView),
        (status = 400, description = "Invalid request or duplicate item name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client, address or inventory not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create(request).await?;
    Ok(created_response(order))
}
