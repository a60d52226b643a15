use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::with_transaction;
use crate::entities::{address, client};
use crate::errors::{ensure_deleted, not_found, ServiceError};
use crate::services::clients::CLIENT_NOT_FOUND;
use crate::services::snapshots::ADDRESS_NOT_FOUND;

pub const ADDRESS_TO_REMOVE_NOT_FOUND: &str =
    "Address requested to be removed not found in the database.";

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub person_name: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub country: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub city: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub region: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub street: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub building_number: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub postal_code: String,
}

impl CreateAddressRequest {
    pub(crate) fn into_active_model(self, client_id: i64) -> address::ActiveModel {
        address::ActiveModel {
            person_name: Set(self.person_name),
            country: Set(self.country),
            city: Set(self.city),
            region: Set(self.region),
            street: Set(self.street),
            building_number: Set(self.building_number),
            postal_code: Set(self.postal_code),
            client_id: Set(client_id),
            ..Default::default()
        }
    }
}

/// Omitted fields are left unchanged; present ones may not be blank.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub person_name: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub country: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub city: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub region: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub street: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub building_number: Option<String>,
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub id: i64,
    pub person_name: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub street: String,
    pub building_number: String,
    pub postal_code: String,
}

impl From<address::Model> for AddressView {
    fn from(model: address::Model) -> Self {
        Self {
            id: model.id,
            person_name: model.person_name,
            country: model.country,
            city: model.city,
            region: model.region,
            street: model.street,
            building_number: model.building_number,
            postal_code: model.postal_code,
        }
    }
}

#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        client_id: i64,
        request: CreateAddressRequest,
    ) -> Result<AddressView, ServiceError> {
        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                require_client(txn, client_id).await?;
                Ok(request.into_active_model(client_id).insert(txn).await?)
            })
        })
        .await?;

        info!(address_id = created.id, client_id, "address created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateAddressRequest,
    ) -> Result<AddressView, ServiceError> {
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = address::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(ADDRESS_NOT_FOUND))?;

                let mut active: address::ActiveModel = existing.into();
                let UpdateAddressRequest {
                    person_name,
                    country,
                    city,
                    region,
                    street,
                    building_number,
                    postal_code,
                } = request;
                if let Some(value) = person_name {
                    active.person_name = Set(value);
                }
                if let Some(value) = country {
                    active.country = Set(value);
                }
                if let Some(value) = city {
                    active.city = Set(value);
                }
                if let Some(value) = region {
                    active.region = Set(value);
                }
                if let Some(value) = street {
                    active.street = Set(value);
                }
                if let Some(value) = building_number {
                    active.building_number = Set(value);
                }
                if let Some(value) = postal_code {
                    active.postal_code = Set(value);
                }
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(address_id = id, "address updated");
        Ok(updated.into())
    }

    /// Orders already placed keep their own copies of the address.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = address::Entity::delete_by_id(id).exec(&*self.db).await?;
        ensure_deleted(result, ADDRESS_TO_REMOVE_NOT_FOUND).map_err(|err| {
            warn!(address_id = id, "delete of unknown address");
            err
        })?;
        info!(address_id = id, "address deleted");
        Ok(())
    }
}

pub(crate) async fn require_client<C: ConnectionTrait>(
    conn: &C,
    client_id: i64,
) -> Result<client::Model, ServiceError> {
    client::Entity::find_by_id(client_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(client_id, "client lookup failed");
            not_found(CLIENT_NOT_FOUND)
        })
}
