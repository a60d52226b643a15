use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{with_read_only, with_transaction};
use crate::entities::{address, client, contact, order, ordering_address, ClientType};
use crate::errors::{ensure_deleted, not_found, ServiceError};
use crate::services::addresses::{AddressView, CreateAddressRequest};
use crate::services::contacts::{ContactView, CreateContactRequest};

pub const CLIENT_NOT_FOUND: &str = "Client not found in the database.";
pub const CLIENT_TO_REMOVE_NOT_FOUND: &str =
    "Client requested to be removed not found in the database.";

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: String,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::client_type")]
    #[schema(example = "ORGANISATION")]
    pub client_type: String,
    #[serde(default)]
    #[validate]
    pub addresses: Vec<CreateAddressRequest>,
    #[serde(default)]
    #[validate]
    pub contacts: Vec<CreateContactRequest>,
}

/// Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: Option<String>,
    #[validate(custom = "crate::handlers::common::client_type")]
    pub client_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub id: i64,
    pub name: String,
    pub client_type: ClientType,
    pub addresses: Vec<AddressView>,
    pub contacts: Vec<ContactView>,
}

impl ClientView {
    fn assemble(
        client: client::Model,
        addresses: Vec<address::Model>,
        contacts: Vec<contact::Model>,
    ) -> Self {
        Self {
            id: client.id,
            name: client.name,
            client_type: client.client_type,
            addresses: addresses.into_iter().map(AddressView::from).collect(),
            contacts: contacts.into_iter().map(ContactView::from).collect(),
        }
    }
}

#[derive(Clone)]
pub struct ClientService {
    db: Arc<DatabaseConnection>,
}

impl ClientService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ClientView>, ServiceError> {
        with_read_only(&self.db, |txn| {
            Box::pin(async move {
                let clients = client::Entity::find()
                    .order_by_asc(client::Column::Id)
                    .all(txn)
                    .await?;
                let addresses = clients.load_many(address::Entity, txn).await?;
                let contacts = clients.load_many(contact::Entity, txn).await?;

                Ok(clients
                    .into_iter()
                    .zip(addresses)
                    .zip(contacts)
                    .map(|((client, addresses), contacts)| {
                        ClientView::assemble(client, addresses, contacts)
                    })
                    .collect())
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<ClientView, ServiceError> {
        with_read_only(&self.db, move |txn| {
            Box::pin(async move { load_view(txn, id).await })
        })
        .await
    }

    /// Inserts the client and its nested addresses and contacts as one unit.
    #[instrument(skip(self, request), fields(name = %request.name, addresses = request.addresses.len(), contacts = request.contacts.len()))]
    pub async fn create(&self, request: CreateClientRequest) -> Result<ClientView, ServiceError> {
        let client_type = parse_client_type(&request.client_type)?;

        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let client = client::ActiveModel {
                    name: Set(request.name),
                    client_type: Set(client_type),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut addresses = Vec::with_capacity(request.addresses.len());
                for address in request.addresses {
                    addresses.push(address.into_active_model(client.id).insert(txn).await?);
                }
                let mut contacts = Vec::with_capacity(request.contacts.len());
                for contact in request.contacts {
                    contacts.push(contact.into_active_model(client.id).insert(txn).await?);
                }
                Ok(ClientView::assemble(client, addresses, contacts))
            })
        })
        .await?;

        info!(client_id = created.id, "client created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateClientRequest,
    ) -> Result<ClientView, ServiceError> {
        let client_type = request
            .client_type
            .as_deref()
            .map(parse_client_type)
            .transpose()?;

        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = client::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(CLIENT_NOT_FOUND))?;

                let mut active: client::ActiveModel = existing.into();
                if let Some(name) = request.name {
                    active.name = Set(name);
                }
                if let Some(client_type) = client_type {
                    active.client_type = Set(client_type);
                }
                active.update(txn).await?;
                load_view(txn, id).await
            })
        })
        .await?;

        info!(client_id = id, "client updated");
        Ok(updated)
    }

    /// Removes the client with its addresses, contacts and orders, plus the
    /// address snapshots those orders pointed at.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let snapshots = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let orders = order::Entity::find()
                    .filter(order::Column::ClientId.eq(id))
                    .all(txn)
                    .await?;
                let snapshot_ids: Vec<i64> = orders
                    .iter()
                    .flat_map(|o| [o.billing_address_id, o.shipping_address_id])
                    .collect();

                let result = client::Entity::delete_by_id(id).exec(txn).await?;
                ensure_deleted(result, CLIENT_TO_REMOVE_NOT_FOUND)?;

                if snapshot_ids.is_empty() {
                    return Ok(0);
                }
                let removed = ordering_address::Entity::delete_many()
                    .filter(ordering_address::Column::Id.is_in(snapshot_ids))
                    .exec(txn)
                    .await?;
                Ok(removed.rows_affected)
            })
        })
        .await
        .map_err(|err| {
            if matches!(err, ServiceError::NotFound(_)) {
                warn!(client_id = id, "delete of unknown client");
            }
            err
        })?;

        info!(client_id = id, snapshots, "client deleted");
        Ok(())
    }
}

async fn load_view<C: ConnectionTrait>(conn: &C, id: i64) -> Result<ClientView, ServiceError> {
    let client = client::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(CLIENT_NOT_FOUND))?;
    let addresses = client
        .find_related(address::Entity)
        .order_by_asc(address::Column::Id)
        .all(conn)
        .await?;
    let contacts = client
        .find_related(contact::Entity)
        .order_by_asc(contact::Column::Id)
        .all(conn)
        .await?;
    Ok(ClientView::assemble(client, addresses, contacts))
}

fn parse_client_type(raw: &str) -> Result<ClientType, ServiceError> {
    ClientType::from_str(raw)
        .map_err(|_| ServiceError::validation(format!("Unknown client type {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::flatten_validation_errors;

    #[test]
    fn nested_violations_are_reported_with_their_position() {
        let request = CreateClientRequest {
            name: "Acme".into(),
            client_type: "COMPANY".into(),
            addresses: vec![CreateAddressRequest {
                person_name: "Wile E.".into(),
                country: "US".into(),
                city: "".into(),
                region: "AZ".into(),
                street: "Desert Rd".into(),
                building_number: "1".into(),
                postal_code: "85001".into(),
            }],
            contacts: vec![],
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(
            flatten_validation_errors(&errors),
            vec![
                "Client type has to be one of: INDIVIDUAL, ORGANISATION".to_string(),
                "addresses[0].city cannot be blank".to_string(),
            ]
        );
    }

    #[test]
    fn wire_names_parse_to_client_types() {
        assert_eq!(parse_client_type("INDIVIDUAL").unwrap(), ClientType::Individual);
        assert!(parse_client_type("individual").is_err());
    }
}
