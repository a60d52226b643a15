use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{with_read_only, with_transaction};
use crate::entities::{category, inventory};
use crate::errors::{ensure_deleted, not_found, on_unique_violation, ServiceError};
use crate::handlers::common::merge_optional;
use crate::services::inventory::InventorySummary;
use crate::services::membership::{Association, CategoryAggregate, CATEGORY_NOT_FOUND};
use crate::slug::Slugifier;

pub const CATEGORY_NOT_UNIQUE: &str = "Save operation was not performed. Category with generated slug / name already exists. Slug / name has to be unique.";
pub const CATEGORY_NAME_WITHOUT_SLUG: &str = "Name has to contain at least one letter or digit";
pub const CATEGORY_TO_REMOVE_NOT_FOUND: &str =
    "Category requested to be removed not found in the database.";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: String,
    pub description: Option<String>,
}

/// Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(custom = "crate::handlers::common::not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl From<category::Model> for CategorySummary {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithInventories {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub inventories: Vec<InventorySummary>,
}

impl From<CategoryAggregate> for CategoryWithInventories {
    fn from(aggregate: CategoryAggregate) -> Self {
        let inventories = match aggregate.inventories {
            Association::Loaded(members) => members.into_iter().map(InventorySummary::from).collect(),
            Association::Unloaded => Vec::new(),
        };
        let summary = CategorySummary::from(aggregate.category);
        Self {
            id: summary.id,
            name: summary.name,
            slug: summary.slug,
            description: summary.description,
            inventories,
        }
    }
}

/// Category CRUD. The slug is re-derived from the name on every write.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    slugifier: Slugifier,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, slugifier: Slugifier) -> Self {
        Self { db, slugifier }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CategorySummary>, ServiceError> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(categories.into_iter().map(CategorySummary::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<CategoryWithInventories, ServiceError> {
        with_read_only(&self.db, move |txn| {
            Box::pin(async move {
                let found = category::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(CATEGORY_NOT_FOUND))?;
                Ok(load_members(txn, found).await?.into())
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryWithInventories, ServiceError> {
        let slug = slug.to_string();
        with_read_only(&self.db, move |txn| {
            Box::pin(async move {
                let found = category::Entity::find()
                    .filter(category::Column::Slug.eq(slug.as_str()))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(CATEGORY_NOT_FOUND))?;
                Ok(load_members(txn, found).await?.into())
            })
        })
        .await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateCategoryRequest) -> Result<CategorySummary, ServiceError> {
        let slug = derive_slug(self.slugifier, &request.name)?;

        let created = category::ActiveModel {
            name: Set(request.name),
            slug: Set(slug),
            description: Set(request.description),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(on_unique_violation(CATEGORY_NOT_UNIQUE))?;

        info!(category_id = created.id, slug = %created.slug, "category created");
        Ok(created.into())
    }

    /// Merges the request into the stored row and re-derives the slug from the
    /// resulting name, even when only the description changed.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCategoryRequest,
    ) -> Result<CategorySummary, ServiceError> {
        let slugifier = self.slugifier;
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = category::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found(CATEGORY_NOT_FOUND))?;

                let name = request.name.unwrap_or_else(|| existing.name.clone());
                let description = merge_optional(existing.description.clone(), request.description);
                let slug = derive_slug(slugifier, &name)?;

                let mut active: category::ActiveModel = existing.into();
                active.name = Set(name);
                active.slug = Set(slug);
                active.description = Set(description);

                active
                    .update(txn)
                    .await
                    .map_err(on_unique_violation(CATEGORY_NOT_UNIQUE))
            })
        })
        .await?;

        info!(category_id = updated.id, slug = %updated.slug, "category updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = category::Entity::delete_by_id(id).exec(&*self.db).await?;
        ensure_deleted(result, CATEGORY_TO_REMOVE_NOT_FOUND).map_err(|err| {
            warn!(category_id = id, "delete of unknown category");
            err
        })?;
        info!(category_id = id, "category deleted");
        Ok(())
    }
}

/// Names made only of punctuation or symbols slugify to nothing and are rejected
/// before the store is touched.
fn derive_slug(slugifier: Slugifier, name: &str) -> Result<String, ServiceError> {
    let slug = slugifier.slugify(name);
    if slug.is_empty() {
        return Err(ServiceError::validation(CATEGORY_NAME_WITHOUT_SLUG));
    }
    Ok(slug)
}

async fn load_members<C: sea_orm::ConnectionTrait>(
    conn: &C,
    found: category::Model,
) -> Result<CategoryAggregate, ServiceError> {
    let members = found
        .find_related(inventory::Entity)
        .order_by_asc(inventory::Column::Id)
        .all(conn)
        .await?;
    Ok(CategoryAggregate {
        category: found,
        inventories: Association::Loaded(members),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("!!!")]
    #[case("???")]
    #[case("—")]
    #[case(" - / - ")]
    fn symbol_only_names_have_no_slug(#[case] name: &str) {
        let err = derive_slug(Slugifier::new(), name).unwrap_err();
        assert_matches!(err, ServiceError::ValidationFailed(details) if details == vec![CATEGORY_NAME_WITHOUT_SLUG.to_string()]);
    }

    #[test]
    fn names_with_letters_keep_their_slug() {
        assert_eq!(derive_slug(Slugifier::new(), "C++ & C#").unwrap(), "c-c");
    }
}
