use crate::errors::ServiceError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::from)
}

/// Path ids start at 1; `label` names the entity in the message.
pub fn ensure_id(id: i64, label: &str) -> Result<i64, ServiceError> {
    if id < 1 {
        return Err(ServiceError::validation(format!(
            "{label} id cannot be smaller than 1"
        )));
    }
    Ok(id)
}

/// JSON body that is deserialized and then validated.
///
/// Malformed bodies and rule violations both surface as
/// [`ServiceError::ValidationFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ServiceError::validation(format!("Malformed request body: {}", rejection.body_text()))
        })?;
        validate_input(&value)?;
        Ok(Self(value))
    }
}

/// Path parameters whose parse failures surface as [`ServiceError::ValidationFailed`]
/// instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ServiceError::validation(format!(
                    "Malformed path parameter: {}",
                    rejection.body_text()
                ))
            })?;
        Ok(Self(value))
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Blank is allowed (the contact may only have a phone); anything else must be an address.
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

pub fn client_type(value: &str) -> Result<(), ValidationError> {
    one_of::<crate::entities::ClientType>(value, "Client type has to be one of: INDIVIDUAL, ORGANISATION")
}

pub fn quantity_type(value: &str) -> Result<(), ValidationError> {
    one_of::<crate::entities::QuantityType>(
        value,
        "Quantity type has to be one of: COUNTABLE, DISTANCE, AREA, VOLUME, MASS",
    )
}

fn one_of<E: FromStr>(value: &str, message: &'static str) -> Result<(), ValidationError> {
    match E::from_str(value) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("one_of");
            err.message = Some(message.into());
            Err(err)
        }
    }
}

/// Null means "leave unchanged"; a blank string clears the value.
pub fn merge_optional(current: Option<String>, requested: Option<String>) -> Option<String> {
    match requested {
        None => current,
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}
