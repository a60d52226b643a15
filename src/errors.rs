use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{error::DbErr, DeleteResult, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "timestamp": "2024-12-09T10:30:00Z",
    "statusCode": 404,
    "error": "Not Found",
    "message": "Client not found in the database."
}))]
pub struct ErrorResponse {
    /// RFC 3339 timestamp of the failure
    pub timestamp: String,
    /// Numeric HTTP status
    pub status_code: u16,
    /// Canonical reason phrase of the status
    pub error: String,
    /// Human-readable description
    pub message: String,
    /// Every violated rule, present for validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotUnique(String),

    #[error("Validation failed with: {} errors.", .0.len())]
    ValidationFailed(Vec<String>),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotUnique(_) | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to a caller. Store and internal failures are masked.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn details(&self) -> Option<Vec<String>> {
        match self {
            Self::ValidationFailed(details) => Some(details.clone()),
            _ => None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![message.into()])
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::ValidationFailed(flatten_validation_errors(&errors))
    }
}

/// Flattens nested validator output into sorted, readable messages.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, None, &mut messages);
    messages.sort();
    messages
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match (prefix, *field) {
            (Some(prefix), "__all__") => prefix.to_string(),
            (Some(prefix), field) => format!("{prefix}.{field}"),
            (None, field) => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(describe(&path, error));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&path), out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect(nested, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

fn describe(path: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let label = humanize(path);
    match error.code.as_ref() {
        "blank" => format!("{label} cannot be blank"),
        "required" => format!("{label} is required"),
        "range" => match error.params.get("min").and_then(|min| min.as_f64()) {
            Some(min) => format!("{label} cannot be smaller than {min}"),
            None => format!("{label} is out of range"),
        },
        "email" => format!("{label} has to be a valid email address"),
        code => format!("{label} is invalid ({code})"),
    }
}

/// `person_name` becomes `Person name`; nested paths are kept as-is.
fn humanize(path: &str) -> Cow<'_, str> {
    if path.contains(['.', '[']) {
        return Cow::Borrowed(path);
    }
    let spaced = path.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => Cow::Owned(first.to_uppercase().chain(chars).collect()),
        None => Cow::Borrowed(path),
    }
}

/// Absent row for a lookup.
pub fn not_found(message: &str) -> ServiceError {
    ServiceError::NotFound(message.to_string())
}

/// Maps a unique-constraint violation to `NotUnique(message)`; anything else stays a store error.
pub fn on_unique_violation(message: &'static str) -> impl Fn(DbErr) -> ServiceError {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::warn!(%detail, "unique constraint rejected write");
            ServiceError::NotUnique(message.to_string())
        }
        _ => ServiceError::DatabaseError(err),
    }
}

/// A delete that touched no rows means the id never existed.
pub fn ensure_deleted(result: DeleteResult, message: &str) -> Result<(), ServiceError> {
    if result.rows_affected == 0 {
        Err(not_found(message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1))]
        units: i64,
    }

    #[derive(Validate)]
    struct Request {
        #[validate(custom = "crate::handlers::common::not_blank")]
        person_name: String,
        #[validate(required)]
        client_id: Option<i64>,
        #[validate]
        items: Vec<Line>,
    }

    #[tokio::test]
    async fn not_found_renders_domain_message() {
        let response = ServiceError::NotFound("Client not found in the database.".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.status_code, 404);
        assert_eq!(payload.error, "Not Found");
        assert_eq!(payload.message, "Client not found in the database.");
        assert!(payload.details.is_none());
    }

    #[tokio::test]
    async fn validation_failure_lists_details() {
        let response =
            ServiceError::ValidationFailed(vec!["City cannot be blank".into(), "Country cannot be blank".into()])
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.message, "Validation failed with: 2 errors.");
        assert_eq!(payload.details.unwrap().len(), 2);
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::NotUnique("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("relation missing".into())).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::InternalError("hash failure".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::NotUnique("Name has to be unique.".into()).response_message(),
            "Name has to be unique."
        );
    }

    #[test]
    fn flattening_reports_every_violation() {
        let request = Request {
            person_name: "  ".into(),
            client_id: None,
            items: vec![Line { units: 2 }, Line { units: 0 }],
        };
        let errors = request.validate().unwrap_err();
        let messages = flatten_validation_errors(&errors);

        assert_eq!(
            messages,
            vec![
                "Client id is required".to_string(),
                "Person name cannot be blank".to_string(),
                "items[1].units cannot be smaller than 1".to_string(),
            ]
        );
    }

    #[test]
    fn unrelated_store_errors_are_not_uniqueness() {
        let mapped = on_unique_violation("dup")(DbErr::Custom("boom".into()));
        assert!(matches!(mapped, ServiceError::DatabaseError(_)));
    }
}
