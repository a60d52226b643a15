//! Order assembly and read side.
//!
//! Creating an order happens in two phases inside one transaction: the
//! aggregate is assembled in memory from snapshots of the client's addresses
//! and the requested inventories, then written out table by table. Any failed
//! lookup or rejected write rolls the whole thing back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{with_read_only, with_transaction};
use crate::entities::{item, order, ordering_address, OrderStatus, QuantityType};
use crate::errors::{not_found, on_unique_violation, ServiceError};
use crate::services::addresses::require_client;
use crate::services::snapshots::{
    freeze_address_as_ordering_address, freeze_inventory_as_item, AddressSnapshot, ItemSnapshot,
};

pub const ORDER_NOT_FOUND: &str = "Order not found in the database.";
pub const ITEM_NOT_UNIQUE: &str =
    "Save operation was not performed. Item with this name already exists. Item name has to be unique.";

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    #[validate(range(min = 1))]
    pub client_id: i64,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub billing_address_id: i64,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub shipping_address_id: i64,
    #[serde(default)]
    #[validate]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    #[validate(range(min = 1))]
    pub inventory_id: i64,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub units: i64,
}

/// An order built in memory, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAggregate {
    pub client_id: i64,
    pub billing_address: AddressSnapshot,
    pub shipping_address: AddressSnapshot,
    pub items: Vec<ItemSnapshot>,
    pub status: OrderStatus,
}

/// Resolves every reference in request order and builds the aggregate.
///
/// Billing and shipping are snapshotted separately even when they name the
/// same address.
pub async fn assemble<C: ConnectionTrait>(
    conn: &C,
    request: &CreateOrderRequest,
) -> Result<OrderAggregate, ServiceError> {
    let client = require_client(conn, request.client_id).await?;
    let billing_address = freeze_address_as_ordering_address(conn, request.billing_address_id).await?;
    let shipping_address =
        freeze_address_as_ordering_address(conn, request.shipping_address_id).await?;

    let mut items = Vec::with_capacity(request.items.len());
    for line in &request.items {
        items.push(freeze_inventory_as_item(conn, line.inventory_id, line.units).await?);
    }

    Ok(OrderAggregate {
        client_id: client.id,
        billing_address,
        shipping_address,
        items,
        status: OrderStatus::Processing,
    })
}

/// Writes the aggregate: both address snapshots, the order row, then its items.
/// `created_at` comes from the column default.
pub async fn persist<C: ConnectionTrait>(
    conn: &C,
    aggregate: OrderAggregate,
) -> Result<OrderView, ServiceError> {
    let billing = aggregate.billing_address.into_active_model().insert(conn).await?;
    let shipping = aggregate.shipping_address.into_active_model().insert(conn).await?;

    let order = order::ActiveModel {
        client_id: Set(aggregate.client_id),
        billing_address_id: Set(billing.id),
        shipping_address_id: Set(shipping.id),
        status: Set(aggregate.status),
        created_at: NotSet,
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(aggregate.items.len());
    for snapshot in aggregate.items {
        let saved = snapshot
            .into_active_model(order.id)
            .insert(conn)
            .await
            .map_err(on_unique_violation(ITEM_NOT_UNIQUE))?;
        items.push(saved);
    }

    Ok(OrderView::assemble(order, items, billing, shipping))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub quantity_type: QuantityType,
    pub units: i64,
    pub unit_price: i64,
    pub inventory_id: Option<i64>,
}

impl From<item::Model> for ItemView {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity_type: model.quantity_type,
            units: model.units,
            unit_price: model.unit_price,
            inventory_id: model.inventory_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderingAddressView {
    pub id: i64,
    pub person_name: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub street: String,
    pub building_number: String,
    pub postal_code: String,
}

impl From<ordering_address::Model> for OrderingAddressView {
    fn from(model: ordering_address::Model) -> Self {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i64,
    pub client_id: i64,
    pub items: Vec<ItemView>,
    pub billing_address: OrderingAddressView,
    pub shipping_address: OrderingAddressView,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    fn assemble(
        order: order::Model,
        items: Vec<item::Model>,
        billing: ordering_address::Model,
        shipping: ordering_address::Model,
    ) -> Self {
        Self {
            id: order.id,
            client_id: order.client_id,
            items: items.into_iter().map(ItemView::from).collect(),
            billing_address: billing.into(),
            shipping_address: shipping.into(),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(client_id = request.client_id, items = request.items.len()))]
    pub async fn create(&self, request: CreateOrderRequest) -> Result<OrderView, ServiceError> {
        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let aggregate = assemble(txn, &request).await?;
                persist(txn, aggregate).await
            })
        })
        .await?;

        metrics::counter!("opencrm.orders.created", 1);
        info!(order_id = created.id, items = created.items.len(), "order created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderView>, ServiceError> {
        with_read_only(&self.db, |txn| {
            Box::pin(async move {
                let rows = order::Entity::find()
                    .find_with_related(item::Entity)
                    .order_by_asc(order::Column::Id)
                    .order_by_asc(item::Column::Id)
                    .all(txn)
                    .await?;
                let mut addresses = load_addresses(
                    txn,
                    rows.iter()
                        .flat_map(|(o, _)| [o.billing_address_id, o.shipping_address_id])
                        .collect(),
                )
                .await?;

                rows.into_iter()
                    .map(|(order, items)| {
                        let billing = take_address(&mut addresses, order.billing_address_id)?;
                        let shipping = take_address(&mut addresses, order.shipping_address_id)?;
                        Ok(OrderView::assemble(order, items, billing, shipping))
                    })
                    .collect()
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<OrderView, ServiceError> {
        with_read_only(&self.db, move |txn| {
            Box::pin(async move {
                let (order, items) = order::Entity::find_by_id(id)
                    .find_with_related(item::Entity)
                    .order_by_asc(item::Column::Id)
                    .all(txn)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| not_found(ORDER_NOT_FOUND))?;
                let mut addresses =
                    load_addresses(txn, vec![order.billing_address_id, order.shipping_address_id])
                        .await?;
                let billing = take_address(&mut addresses, order.billing_address_id)?;
                let shipping = take_address(&mut addresses, order.shipping_address_id)?;
                Ok(OrderView::assemble(order, items, billing, shipping))
            })
        })
        .await
    }
}

async fn load_addresses<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<i64>,
) -> Result<HashMap<i64, ordering_address::Model>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ordering_address::Entity::find()
        .filter(ordering_address::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|a| (a.id, a)).collect())
}

fn take_address(
    addresses: &mut HashMap<i64, ordering_address::Model>,
    id: i64,
) -> Result<ordering_address::Model, ServiceError> {
    addresses.remove(&id).ok_or_else(|| {
        ServiceError::InternalError(format!("ordering address {id} missing for order"))
    })
}
