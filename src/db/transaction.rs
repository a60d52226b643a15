/*!
 * Transaction helpers
 *
 * Every multi-row write runs through [`with_transaction`]; response reads that
 * span several tables go through [`with_read_only`].
 */

use futures::future::BoxFuture;
use metrics::counter;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Boxed future returned by a transaction body
pub type TxnFuture<'a, T> = BoxFuture<'a, Result<T, ServiceError>>;

/// Runs `f` inside one transaction. Commits on `Ok`, rolls back on `Err`, and
/// hands the body's error back unchanged.
///
/// ```rust,ignore
/// let order = with_transaction(&db, |txn| {
///     Box::pin(async move {
///         let order = order_row.insert(txn).await?;
///         for item in items {
///             item.insert(txn).await?;
///         }
///         Ok(order)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send,
    T: Send,
{
    let transaction_id = Uuid::new_v4();
    debug!(%transaction_id, "starting transaction");

    let result = db.transaction::<_, T, ServiceError>(f).await;
    finish(transaction_id, result)
}

/// Like [`with_transaction`], but opened in read-only access mode.
///
/// Postgres enforces the mode; SQLite ignores it.
pub async fn with_read_only<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send,
    T: Send,
{
    let transaction_id = Uuid::new_v4();
    debug!(%transaction_id, "starting read-only transaction");

    let result = db
        .transaction_with_config::<_, T, ServiceError>(f, None, Some(AccessMode::ReadOnly))
        .await;
    finish(transaction_id, result)
}

fn finish<T>(
    transaction_id: Uuid,
    result: Result<T, TransactionError<ServiceError>>,
) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            counter!("opencrm_db.transaction.committed", 1);
            debug!(%transaction_id, "transaction committed");
            Ok(value)
        }
        Err(TransactionError::Transaction(err)) => {
            counter!("opencrm_db.transaction.rolled_back", 1);
            warn!(%transaction_id, error = %err, "transaction rolled back");
            Err(err)
        }
        Err(TransactionError::Connection(err)) => {
            counter!("opencrm_db.transaction.rolled_back", 1);
            warn!(%transaction_id, error = %err, "transaction failed at the connection");
            Err(ServiceError::DatabaseError(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{category, prelude::Category};
    use assert_matches::assert_matches;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use tempfile::TempDir;

    async fn migrated_pool(dir: &TempDir) -> DatabaseConnection {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("txn.sqlite").display());
        let db = crate::db::establish_connection_with_config(&crate::db::DbConfig {
            url,
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        db
    }

    fn category_row(name: &str) -> category::ActiveModel {
        category::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(name.to_lowercase()),
            description: Set(None),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn commits_on_ok() {
        let dir = TempDir::new().unwrap();
        let db = migrated_pool(&dir).await;

        let id = with_transaction(&db, |txn| {
            Box::pin(async move { Ok(category_row("Tools").insert(txn).await?.id) })
        })
        .await
        .unwrap();

        assert!(Category::find_by_id(id).one(&db).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rolls_back_and_keeps_the_domain_error() {
        let dir = TempDir::new().unwrap();
        let db = migrated_pool(&dir).await;

        let result: Result<(), _> = with_transaction(&db, |txn| {
            Box::pin(async move {
                category_row("Tools").insert(txn).await?;
                Err(ServiceError::NotFound("Inventory not found in the database.".into()))
            })
        })
        .await;

        assert_matches!(result, Err(ServiceError::NotFound(msg)) if msg == "Inventory not found in the database.");
        assert_eq!(Category::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_only_transaction_reads() {
        let dir = TempDir::new().unwrap();
        let db = migrated_pool(&dir).await;
        category_row("Garden").insert(&db).await.unwrap();

        let count = with_read_only(&db, |txn| {
            Box::pin(async move { Ok(Category::find().count(txn).await?) })
        })
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}
