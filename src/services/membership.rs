//! Inventory/category membership.
//!
//! The join table is the source of truth. In memory, an inventory always
//! carries its full category list, while a category's inventory list may not
//! have been loaded; [`Association`] records which of the two it is, and the
//! reverse side is only touched when it is loaded.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, instrument};

use crate::entities::{category, inventory, inventory_category};
use crate::errors::{not_found, ServiceError};

pub const CATEGORY_NOT_FOUND: &str = "Category not found in the database.";

/// A related collection that may not have been read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association<T> {
    Unloaded,
    Loaded(Vec<T>),
}

impl<T> Association<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Association::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&[T]> {
        match self {
            Association::Loaded(items) => Some(items),
            Association::Unloaded => None,
        }
    }
}

impl<T> Default for Association<T> {
    fn default() -> Self {
        Association::Unloaded
    }
}

/// Inventory together with its categories (owning side, always loaded).
#[derive(Debug, Clone)]
pub struct InventoryAggregate {
    pub inventory: inventory::Model,
    pub categories: Vec<category::Model>,
}

/// Category together with whatever is known about its inventories.
#[derive(Debug, Clone)]
pub struct CategoryAggregate {
    pub category: category::Model,
    pub inventories: Association<inventory::Model>,
}

impl CategoryAggregate {
    pub fn unloaded(category: category::Model) -> Self {
        Self {
            category,
            inventories: Association::Unloaded,
        }
    }
}

/// Adds the pair. Returns false when it was already present.
pub fn attach(inventory: &mut InventoryAggregate, category: &mut CategoryAggregate) -> bool {
    let category_id = category.category.id;
    if inventory.categories.iter().any(|c| c.id == category_id) {
        return false;
    }
    inventory.categories.push(category.category.clone());

    if let Association::Loaded(members) = &mut category.inventories {
        if !members.iter().any(|i| i.id == inventory.inventory.id) {
            members.push(inventory.inventory.clone());
        }
    }
    true
}

/// Removes the pair. Returns false when it was not present.
pub fn detach(inventory: &mut InventoryAggregate, category: &mut CategoryAggregate) -> bool {
    let category_id = category.category.id;
    let before = inventory.categories.len();
    inventory.categories.retain(|c| c.id != category_id);
    if inventory.categories.len() == before {
        return false;
    }

    if let Association::Loaded(members) = &mut category.inventories {
        members.retain(|i| i.id != inventory.inventory.id);
    }
    true
}

/// Resolves every slug, failing on the first unknown one.
async fn resolve_slugs<C: ConnectionTrait>(
    conn: &C,
    slugs: &[String],
) -> Result<Vec<CategoryAggregate>, ServiceError> {
    let mut resolved = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let found = category::Entity::find()
            .filter(category::Column::Slug.eq(slug.as_str()))
            .one(conn)
            .await?
            .ok_or_else(|| not_found(CATEGORY_NOT_FOUND))?;
        resolved.push(CategoryAggregate::unloaded(found));
    }
    Ok(resolved)
}

/// Attaches the categories named by `slugs`, writing join rows only for new pairs.
///
/// All slugs are resolved before anything is written. Returns the number of
/// pairs that were added.
#[instrument(skip(conn, inventory), fields(inventory_id = inventory.inventory.id, slugs = slugs.len()))]
pub async fn attach_by_slugs<C: ConnectionTrait>(
    conn: &C,
    inventory: &mut InventoryAggregate,
    slugs: &[String],
) -> Result<usize, ServiceError> {
    let mut categories = resolve_slugs(conn, slugs).await?;

    let mut added = 0;
    for category in categories.iter_mut() {
        if !attach(inventory, category) {
            debug!(category_id = category.category.id, "already attached");
            continue;
        }
        inventory_category::Entity::insert(inventory_category::ActiveModel {
            inventory_id: Set(inventory.inventory.id),
            category_id: Set(category.category.id),
        })
        .exec_without_returning(conn)
        .await?;
        added += 1;
    }
    Ok(added)
}

/// Detaches the categories named by `slugs`; pairs that do not exist are skipped.
#[instrument(skip(conn, inventory), fields(inventory_id = inventory.inventory.id, slugs = slugs.len()))]
pub async fn detach_by_slugs<C: ConnectionTrait>(
    conn: &C,
    inventory: &mut InventoryAggregate,
    slugs: &[String],
) -> Result<usize, ServiceError> {
    let mut categories = resolve_slugs(conn, slugs).await?;

    let mut removed = 0;
    for category in categories.iter_mut() {
        if !detach(inventory, category) {
            debug!(category_id = category.category.id, "not attached");
            continue;
        }
        inventory_category::Entity::delete_many()
            .filter(inventory_category::Column::InventoryId.eq(inventory.inventory.id))
            .filter(inventory_category::Column::CategoryId.eq(category.category.id))
            .exec(conn)
            .await?;
        removed += 1;
    }
    Ok(removed)
}
