use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, ensure_id, no_content_response, ValidatedJson, ValidatedPath,
};
use crate::handlers::AppState;
use crate::services::clients::{ClientView, CreateClientRequest, UpdateClientRequest};
use crate::services::contacts::{ContactView, CreateContactRequest};

#[utoipa::path(
    get,
    path = "/client",
    summary = "List clients",
    responses(
        (status = 200, description = "Clients with their addresses and contacts", body = [ClientView]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<ClientView>>, ServiceError> {
    Ok(Json(state.services.clients.list().await?))
}

#[utoipa::path(
    get,
    path = "/client/{id}",
    summary = "Get client",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client found", body = ClientView),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ClientView>, ServiceError> {
    let id = ensure_id(id, "Client")?;
    Ok(Json(state.services.clients.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/client",
    summary = "Create client",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created with nested addresses and contacts", body = ClientView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.services.clients.create(request).await?;
    Ok(created_response(client))
}

#[utoipa::path(
    put,
    path = "/client/{id}",
    summary = "Update client",
    params(("id" = i64, Path, description = "Client id")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateClientRequest>,
) -> Result<Json<ClientView>, ServiceError> {
    let id = ensure_id(id, "Client")?;
    Ok(Json(state.services.clients.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/client/{id}",
    summary = "Delete client",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client and everything it owns removed"),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_id(id, "Client")?;
    state.services.clients.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/client/{id}/contact",
    summary = "Add contact to client",
    params(("id" = i64, Path, description = "Client id")),
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "contacts"
)]
pub async fn create_client_contact(
    State(state): State<AppState>,
    ValidatedPath(client_id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<CreateContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client_id = ensure_id(client_id, "Client")?;
    let contact = state.services.contacts.create(client_id, request).await?;
    Ok(created_response(contact))
}
