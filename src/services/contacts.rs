use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::db::with_transaction;
use crate::entities::contact;
use crate::errors::{ensure_deleted, not_found, ServiceError};
use crate::handlers::common::merge_optional;
use crate::services::addresses::require_client;

pub const CONTACT_NOT_FOUND: &str = "Contact not found in the database.";
pub const CONTACT_TO_REMOVE_NOT_FOUND: &str =
    "Contact requested to be removed not found in the database.";
pub const CONTACT_NEEDS_CHANNEL: &str = "Email and phone number cannot be both blank";

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "has_a_channel", skip_on_field_errors = false))]
pub struct CreateContactRequest {
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: String,
    #[validate(custom = "crate::handlers::common::optional_email")]
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl CreateContactRequest {
    pub(crate) fn into_active_model(self, client_id: i64) -> contact::ActiveModel {
        contact::ActiveModel {
            name: Set(self.name),
            email: Set(present(self.email)),
            phone_number: Set(present(self.phone_number)),
            client_id: Set(client_id),
            ..Default::default()
        }
    }
}

fn has_a_channel(request: &CreateContactRequest) -> Result<(), ValidationError> {
    if present(request.email.clone()).is_none() && present(request.phone_number.clone()).is_none() {
        return Err(missing_channel());
    }
    Ok(())
}

/// Omitted fields are left unchanged; a blank email or phone clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: Option<String>,
    #[validate(custom = "crate::handlers::common::optional_email")]
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl From<contact::Model> for ContactView {
    fn from(model: contact::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone_number: model.phone_number,
        }
    }
}

#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        client_id: i64,
        request: CreateContactRequest,
    ) -> Result<ContactView, ServiceError> {
        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                require_client(txn, client_id).await?;
                Ok(request.into_active_model(client_id).insert(txn).await?)
            })
        })
        .await?;

        info!(contact_id = created.id, client_id, "contact created");
        Ok(created.into())
    }

    /// Applies the changes, then checks the merged contact still has an email
    /// or a phone number.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateContactRequest,
    ) -> Result<ContactView, ServiceError> {
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = contact::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(CONTACT_NOT_FOUND))?;

                let email = merge_optional(existing.email.clone(), request.email);
                let phone_number = merge_optional(existing.phone_number.clone(), request.phone_number);
                if email.is_none() && phone_number.is_none() {
                    return Err(ServiceError::validation(CONTACT_NEEDS_CHANNEL));
                }

                let mut active: contact::ActiveModel = existing.into();
                if let Some(name) = request.name {
                    active.name = Set(name);
                }
                active.email = Set(email);
                active.phone_number = Set(phone_number);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(contact_id = id, "contact updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = contact::Entity::delete_by_id(id).exec(&*self.db).await?;
        ensure_deleted(result, CONTACT_TO_REMOVE_NOT_FOUND).map_err(|err| {
            warn!(contact_id = id, "delete of unknown contact");
            err
        })?;
        info!(contact_id = id, "contact deleted");
        Ok(())
    }
}

/// Blank channels are stored as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing_channel() -> ValidationError {
    let mut err = ValidationError::new("channel");
    err.message = Some(CONTACT_NEEDS_CHANNEL.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::flatten_validation_errors;

    fn request(email: Option<&str>, phone: Option<&str>) -> CreateContactRequest {
        CreateContactRequest {
            name: "Grace".into(),
            email: email.map(str::to_string),
            phone_number: phone.map(str::to_string),
        }
    }

    #[test]
    fn one_channel_is_enough() {
        assert!(request(Some("grace@example.com"), None).validate().is_ok());
        assert!(request(None, Some("+44 20 7946 0000")).validate().is_ok());
    }

    #[test]
    fn blank_channels_count_as_missing() {
        let errors = request(Some("  "), Some("")).validate().unwrap_err();
        assert_eq!(
            flatten_validation_errors(&errors),
            vec![CONTACT_NEEDS_CHANNEL.to_string()]
        );
    }

    #[test]
    fn channel_rule_is_reported_with_field_errors() {
        let mut invalid = request(None, None);
        invalid.name = " ".into();
        let errors = invalid.validate().unwrap_err();
        assert_eq!(
            flatten_validation_errors(&errors),
            vec![
                CONTACT_NEEDS_CHANNEL.to_string(),
                "Name cannot be blank".to_string(),
            ]
        );
    }

    #[test]
    fn blank_channels_are_not_stored() {
        let active = request(Some(""), Some("555-0100")).into_active_model(3);
        assert_eq!(active.email, Set(None));
        assert_eq!(active.phone_number, Set(Some("555-0100".to_string())));
    }
}
