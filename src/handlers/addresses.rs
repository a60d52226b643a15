use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, ensure_id, no_content_response, ValidatedJson, ValidatedPath,
};
use crate::handlers::AppState;
use crate::services::addresses::{AddressView, CreateAddressRequest, UpdateAddressRequest};

#[utoipa::path(
    post,
    path = "/address/{id}",
    summary = "Add address to client",
    params(("id" = i64, Path, description = "Owning client id")),
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    ValidatedPath(client_id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<CreateAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client_id = ensure_id(client_id, "Client")?;
    let address = state.services.addresses.create(client_id, request).await?;
    Ok(created_response(address))
}

#[utoipa::path(
    put,
    path = "/address/{id}",
    summary = "Update address",
    params(("id" = i64, Path, description = "Address id")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Address not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateAddressRequest>,
) -> Result<Json<AddressView>, ServiceError> {
    let id = ensure_id(id, "Address")?;
    Ok(Json(state.services.addresses.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/address/{id}",
    summary = "Delete address",
    params(("id" = i64, Path, description = "Address id")),
    responses(
        (status = 204, description = "Address removed"),
        (status = 404, description = "Address not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_id(id, "Address")?;
    state.services.addresses.delete(id).await?;
    Ok(no_content_response())
}
