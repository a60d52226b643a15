use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::errors::ServiceError;
use crate::handlers::common::{ensure_id, no_content_response, ValidatedJson, ValidatedPath};
use crate::handlers::AppState;
use crate::services::contacts::{ContactView, UpdateContactRequest};

#[utoipa::path(
    put,
    path = "/contact/{id}",
    summary = "Update contact",
    params(("id" = i64, Path, description = "Contact id")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactView),
        (status = 400, description = "Invalid request or no channel left", body = crate::errors::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "contacts"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<ContactView>, ServiceError> {
    let id = ensure_id(id, "Contact")?;
    Ok(Json(state.services.contacts.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/contact/{id}",
    summary = "Delete contact",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 204, description = "Contact removed"),
        (status = 404, description = "Contact not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "contacts"
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_id(id, "Contact")?;
    state.services.contacts.delete(id).await?;
    Ok(no_content_response())
}
