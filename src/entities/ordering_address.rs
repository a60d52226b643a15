use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order-private copy of an address. Carries no link back to its source.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ordering_address")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub person_name: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub street: String,
    pub building_number: String,
    pub postal_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
