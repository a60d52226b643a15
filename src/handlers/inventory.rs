use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, ensure_id, no_content_response, ValidatedJson, ValidatedPath,
};
use crate::handlers::AppState;
use crate::services::inventory::{
    AttachOrDetachCategoriesRequest, CreateInventoryRequest, InventoryWithCategories,
    UpdateInventoryRequest,
};

#[utoipa::path(
    get,
    path = "/inventory",
    summary = "List inventory",
    responses(
        (status = 200, description = "All inventories with their categories", body = [InventoryWithCategories]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryWithCategories>>, ServiceError> {
    Ok(Json(state.services.inventory.list().await?))
}

#[utoipa::path(
    get,
    path = "/inventory/{id}",
    summary = "Get inventory",
    params(("id" = i64, Path, description = "Inventory id")),
    responses(
        (status = 200, description = "Inventory with its categories", body = InventoryWithCategories),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<InventoryWithCategories>, ServiceError> {
    let id = ensure_id(id, "Inventory")?;
    Ok(Json(state.services.inventory.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/inventory",
    summary = "Create inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Inventory created", body = InventoryWithCategories),
        (status = 400, description = "Invalid request or name taken", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown category slug", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateInventoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let inventory = state.services.inventory.create(request).await?;
    Ok(created_response(inventory))
}

#[utoipa::path(
    put,
    path = "/inventory/{id}",
    summary = "Update inventory",
    params(("id" = i64, Path, description = "Inventory id")),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory updated", body = InventoryWithCategories),
        (status = 400, description = "Invalid request or name taken", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateInventoryRequest>,
) -> Result<Json<InventoryWithCategories>, ServiceError> {
    let id = ensure_id(id, "Inventory")?;
    Ok(Json(state.services.inventory.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    summary = "Delete inventory",
    params(("id" = i64, Path, description = "Inventory id")),
    responses(
        (status = 204, description = "Inventory removed"),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_id(id, "Inventory")?;
    state.services.inventory.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    put,
    path = "/inventory/{id}/category",
    summary = "Attach categories",
    params(("id" = i64, Path, description = "Inventory id")),
    request_body = AttachOrDetachCategoriesRequest,
    responses(
        (status = 200, description = "Categories attached; already attached ones are skipped", body = InventoryWithCategories),
        (status = 404, description = "Inventory or category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn attach_categories(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<AttachOrDetachCategoriesRequest>,
) -> Result<Json<InventoryWithCategories>, ServiceError> {
    let id = ensure_id(id, "Inventory")?;
    Ok(Json(state.services.inventory.attach_categories(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/inventory/{id}/category",
    summary = "Detach categories",
    params(("id" = i64, Path, description = "Inventory id")),
    request_body = AttachOrDetachCategoriesRequest,
    responses(
        (status = 200, description = "Categories detached; absent pairs are skipped", body = InventoryWithCategories),
        (status = 404, description = "Inventory or category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn detach_categories(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<AttachOrDetachCategoriesRequest>,
) -> Result<Json<InventoryWithCategories>, ServiceError> {
    let id = ensure_id(id, "Inventory")?;
    Ok(Json(state.services.inventory.detach_categories(id, request).await?))
}
