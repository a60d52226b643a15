//! Point-in-time copies taken while an order is assembled.
//!
//! A snapshot is a plain value: once built it has no link to the row it was
//! copied from, except the traceability id an item keeps for its inventory.

use sea_orm::{ConnectionTrait, EntityTrait, Set};
use serde::Serialize;

use crate::entities::{address, inventory, item, ordering_address, QuantityType};
use crate::errors::{not_found, ServiceError};

pub const ADDRESS_NOT_FOUND: &str = "Address not found in the database.";
pub const INVENTORY_NOT_FOUND: &str = "Inventory not found in the database.";

/// Frozen inventory line, not yet attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub name: String,
    pub quantity_type: QuantityType,
    pub unit_price: i64,
    pub units: i64,
    pub inventory_id: i64,
}

impl ItemSnapshot {
    pub fn of(source: &inventory::Model, units: i64) -> Self {
        Self {
            name: source.name.clone(),
            quantity_type: source.quantity_type,
            unit_price: source.unit_price,
            units,
            inventory_id: source.id,
        }
    }

    pub(crate) fn into_active_model(self, order_id: i64) -> item::ActiveModel {
        item::ActiveModel {
            name: Set(self.name),
            quantity_type: Set(self.quantity_type),
            units: Set(self.units),
            unit_price: Set(self.unit_price),
            inventory_id: Set(Some(self.inventory_id)),
            order_id: Set(order_id),
            ..Default::default()
        }
    }
}

/// Frozen address; becomes a fresh `ordering_address` row on persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressSnapshot {
    pub person_name: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub street: String,
    pub building_number: String,
    pub postal_code: String,
}

impl From<&address::Model> for AddressSnapshot {
    fn from(source: &address::Model) -> Self {
        Self {
            person_name: source.person_name.clone(),
            country: source.country.clone(),
            city: source.city.clone(),
            region: source.region.clone(),
            street: source.street.clone(),
            building_number: source.building_number.clone(),
            postal_code: source.postal_code.clone(),
        }
    }
}

impl AddressSnapshot {
    pub(crate) fn into_active_model(self) -> ordering_address::ActiveModel {
        ordering_address::ActiveModel {
            person_name: Set(self.person_name),
            country: Set(self.country),
            city: Set(self.city),
            region: Set(self.region),
            street: Set(self.street),
            building_number: Set(self.building_number),
            postal_code: Set(self.postal_code),
            ..Default::default()
        }
    }
}

/// Copies the inventory's current name, unit type and price. Stock is left alone.
pub async fn freeze_inventory_as_item<C: ConnectionTrait>(
    conn: &C,
    inventory_id: i64,
    units: i64,
) -> Result<ItemSnapshot, ServiceError> {
    let source = inventory::Entity::find_by_id(inventory_id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(INVENTORY_NOT_FOUND))?;
    Ok(ItemSnapshot::of(&source, units))
}

pub async fn freeze_address_as_ordering_address<C: ConnectionTrait>(
    conn: &C,
    address_id: i64,
) -> Result<AddressSnapshot, ServiceError> {
    let source = address::Entity::find_by_id(address_id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(ADDRESS_NOT_FOUND))?;
    Ok(AddressSnapshot::from(&source))
}
