use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{with_read_only, with_transaction};
use crate::entities::{category, inventory, QuantityType};
use crate::errors::{ensure_deleted, not_found, on_unique_violation, ServiceError};
use crate::handlers::common::merge_optional;
use crate::services::categories::CategorySummary;
use crate::services::membership::{attach_by_slugs, detach_by_slugs, InventoryAggregate};
use crate::services::snapshots::INVENTORY_NOT_FOUND;

pub const INVENTORY_NOT_UNIQUE: &str =
    "Save operation was not performed. Inventory with this name already exists. Name has to be unique.";
pub const INVENTORY_TO_REMOVE_NOT_FOUND: &str =
    "Inventory requested to be removed not found in the database.";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryRequest {
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: String,
    pub description: Option<String>,
    #[validate(required, range(min = 0))]
    pub unit_price: Option<i64>,
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::quantity_type")]
    #[schema(example = "COUNTABLE")]
    pub quantity_type: String,
    #[validate(required, range(min = 0))]
    pub units: Option<i64>,
    /// Existing category slugs to attach on creation
    #[serde(default)]
    pub categories_slugs: Vec<String>,
}

/// Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub unit_price: Option<i64>,
    #[validate(custom = "crate::handlers::common::quantity_type")]
    pub quantity_type: Option<String>,
    #[validate(range(min = 0))]
    pub units: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachOrDetachCategoriesRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Categories slugs cannot be empty"))]
    pub categories_slugs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: i64,
    pub quantity_type: QuantityType,
    pub units: i64,
}

impl From<inventory::Model> for InventorySummary {
    fn from(model: inventory::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            unit_price: model.unit_price,
            quantity_type: model.quantity_type,
            units: model.units,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryWithCategories {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: i64,
    pub quantity_type: QuantityType,
    pub units: i64,
    pub categories: Vec<CategorySummary>,
}

impl From<InventoryAggregate> for InventoryWithCategories {
    fn from(aggregate: InventoryAggregate) -> Self {
        let InventoryAggregate {
            inventory,
            mut categories,
        } = aggregate;
        categories.sort_by_key(|c| c.id);
        Self {
            id: inventory.id,
            name: inventory.name,
            description: inventory.description,
            unit_price: inventory.unit_price,
            quantity_type: inventory.quantity_type,
            units: inventory.units,
            categories: categories.into_iter().map(CategorySummary::from).collect(),
        }
    }
}

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<InventoryWithCategories>, ServiceError> {
        with_read_only(&self.db, |txn| {
            Box::pin(async move {
                let rows = inventory::Entity::find()
                    .find_with_related(category::Entity)
                    .order_by_asc(inventory::Column::Id)
                    .all(txn)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|(inventory, categories)| {
                        InventoryAggregate {
                            inventory,
                            categories,
                        }
                        .into()
                    })
                    .collect())
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<InventoryWithCategories, ServiceError> {
        with_read_only(&self.db, move |txn| {
            Box::pin(async move { Ok(load_aggregate(txn, id).await?.into()) })
        })
        .await
    }

    /// Inserts the inventory and attaches the requested categories in one
    /// transaction. An unknown slug aborts the whole creation.
    #[instrument(skip(self, request), fields(name = %request.name, slugs = request.categories_slugs.len()))]
    pub async fn create(
        &self,
        request: CreateInventoryRequest,
    ) -> Result<InventoryWithCategories, ServiceError> {
        let quantity_type = parse_quantity_type(&request.quantity_type)?;

        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let inserted = inventory::ActiveModel {
                    name: Set(request.name),
                    description: Set(request.description),
                    unit_price: Set(request.unit_price.unwrap_or_default()),
                    quantity_type: Set(quantity_type),
                    units: Set(request.units.unwrap_or_default()),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(on_unique_violation(INVENTORY_NOT_UNIQUE))?;

                let mut aggregate = InventoryAggregate {
                    inventory: inserted,
                    categories: Vec::new(),
                };
                if !request.categories_slugs.is_empty() {
                    attach_by_slugs(txn, &mut aggregate, &request.categories_slugs).await?;
                }
                Ok(aggregate)
            })
        })
        .await?;

        info!(
            inventory_id = created.inventory.id,
            categories = created.categories.len(),
            "inventory created"
        );
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateInventoryRequest,
    ) -> Result<InventoryWithCategories, ServiceError> {
        let quantity_type = request
            .quantity_type
            .as_deref()
            .map(parse_quantity_type)
            .transpose()?;

        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = inventory::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(INVENTORY_NOT_FOUND))?;
                let description = merge_optional(existing.description.clone(), request.description);

                let mut active: inventory::ActiveModel = existing.into();
                if let Some(name) = request.name {
                    active.name = Set(name);
                }
                active.description = Set(description);
                if let Some(unit_price) = request.unit_price {
                    active.unit_price = Set(unit_price);
                }
                if let Some(quantity_type) = quantity_type {
                    active.quantity_type = Set(quantity_type);
                }
                if let Some(units) = request.units {
                    active.units = Set(units);
                }

                active
                    .update(txn)
                    .await
                    .map_err(on_unique_violation(INVENTORY_NOT_UNIQUE))?;
                load_aggregate(txn, id).await
            })
        })
        .await?;

        info!(inventory_id = id, "inventory updated");
        Ok(updated.into())
    }

    #[instrument(skip(self, request), fields(slugs = request.categories_slugs.len()))]
    pub async fn attach_categories(
        &self,
        id: i64,
        request: AttachOrDetachCategoriesRequest,
    ) -> Result<InventoryWithCategories, ServiceError> {
        let (aggregate, added) = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let mut aggregate = load_aggregate(txn, id).await?;
                let added = attach_by_slugs(txn, &mut aggregate, &request.categories_slugs).await?;
                Ok((aggregate, added))
            })
        })
        .await?;

        info!(inventory_id = id, added, "categories attached");
        Ok(aggregate.into())
    }

    #[instrument(skip(self, request), fields(slugs = request.categories_slugs.len()))]
    pub async fn detach_categories(
        &self,
        id: i64,
        request: AttachOrDetachCategoriesRequest,
    ) -> Result<InventoryWithCategories, ServiceError> {
        let (aggregate, removed) = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let mut aggregate = load_aggregate(txn, id).await?;
                let removed = detach_by_slugs(txn, &mut aggregate, &request.categories_slugs).await?;
                Ok((aggregate, removed))
            })
        })
        .await?;

        info!(inventory_id = id, removed, "categories detached");
        Ok(aggregate.into())
    }

    /// Join rows go with the inventory; items that snapshot it keep their data
    /// and lose the link.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = inventory::Entity::delete_by_id(id).exec(&*self.db).await?;
        ensure_deleted(result, INVENTORY_TO_REMOVE_NOT_FOUND).map_err(|err| {
            warn!(inventory_id = id, "delete of unknown inventory");
            err
        })?;
        info!(inventory_id = id, "inventory deleted");
        Ok(())
    }
}

async fn load_aggregate<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<InventoryAggregate, ServiceError> {
    let found = inventory::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(INVENTORY_NOT_FOUND))?;
    let categories = found
        .find_related(category::Entity)
        .order_by_asc(category::Column::Id)
        .all(conn)
        .await?;
    Ok(InventoryAggregate {
        inventory: found,
        categories,
    })
}

fn parse_quantity_type(raw: &str) -> Result<QuantityType, ServiceError> {
    QuantityType::from_str(raw)
        .map_err(|_| ServiceError::validation(format!("Unknown quantity type {raw}")))
}
