use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory category. `slug` is always derived from `name`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_category::Entity")]
    InventoryCategory,
}

impl Related<super::inventory_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryCategory.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        super::inventory_category::Relation::Inventory.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::inventory_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
