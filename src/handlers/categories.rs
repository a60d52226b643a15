use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, ensure_id, no_content_response, ValidatedJson, ValidatedPath,
};
use crate::handlers::AppState;
use crate::services::categories::{
    CategorySummary, CategoryWithInventories, CreateCategoryRequest, UpdateCategoryRequest,
};

#[utoipa::path(
    get,
    path = "/category",
    summary = "List categories",
    responses(
        (status = 200, description = "All categories", body = [CategorySummary]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, ServiceError> {
    Ok(Json(state.services.categories.list().await?))
}

#[utoipa::path(
    get,
    path = "/category/{id}",
    summary = "Get category",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category with its inventories", body = CategoryWithInventories),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<CategoryWithInventories>, ServiceError> {
    let id = ensure_id(id, "Category")?;
    Ok(Json(state.services.categories.get(id).await?))
}

#[utoipa::path(
    get,
    path = "/category-inventory/{slug}",
    summary = "Get category by slug",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category with its inventories", body = CategoryWithInventories),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    ValidatedPath(slug): ValidatedPath<String>,
) -> Result<Json<CategoryWithInventories>, ServiceError> {
    Ok(Json(state.services.categories.get_by_slug(&slug).await?))
}

#[utoipa::path(
    post,
    path = "/category",
    summary = "Create category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created; slug derived from the name", body = CategorySummary),
        (status = 400, description = "Invalid request or name/slug taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create(request).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    put,
    path = "/category/{id}",
    summary = "Update category",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated; slug re-derived", body = CategorySummary),
        (status = 400, description = "Invalid request or name/slug taken", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Json<CategorySummary>, ServiceError> {
    let id = ensure_id(id, "Category")?;
    Ok(Json(state.services.categories.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/category/{id}",
    summary = "Delete category",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category removed"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_id(id, "Category")?;
    state.services.categories.delete(id).await?;
    Ok(no_content_response())
}
