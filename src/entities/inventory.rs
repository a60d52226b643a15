use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stocked product. Owning side of the inventory/category association.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub unit_price: i64,
    pub quantity_type: QuantityType,
    pub units: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_category::Entity")]
    InventoryCategory,
    #[sea_orm(has_many = "super::item::Entity")]
    Item,
}

impl Related<super::inventory_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryCategory.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::inventory_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::inventory_category::Relation::Inventory.def().rev())
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Unit an inventory is measured in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
    DeriveActiveEnum,
    strum::EnumString,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantityType {
    #[sea_orm(string_value = "COUNTABLE")]
    Countable,
    #[sea_orm(string_value = "DISTANCE")]
    Distance,
    #[sea_orm(string_value = "AREA")]
    Area,
    #[sea_orm(string_value = "VOLUME")]
    Volume,
    #[sea_orm(string_value = "MASS")]
    Mass,
}
