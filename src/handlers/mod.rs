pub mod addresses;
pub mod categories;
pub mod clients;
pub mod common;
pub mod contacts;
pub mod health;
pub mod inventory;
pub mod orders;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::services;
use crate::slug::Slugifier;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by the HTTP handlers, built once over the shared pool.
#[derive(Clone)]
pub struct AppServices {
    pub clients: Arc<services::clients::ClientService>,
    pub addresses: Arc<services::addresses::AddressService>,
    pub contacts: Arc<services::contacts::ContactService>,
    pub categories: Arc<services::categories::CategoryService>,
    pub inventory: Arc<services::inventory::InventoryService>,
    pub orders: Arc<services::orders::OrderService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, slugifier: Slugifier) -> Self {
        Self {
            clients: Arc::new(services::clients::ClientService::new(db.clone())),
            addresses: Arc::new(services::addresses::AddressService::new(db.clone())),
            contacts: Arc::new(services::contacts::ContactService::new(db.clone())),
            categories: Arc::new(services::categories::CategoryService::new(
                db.clone(),
                slugifier,
            )),
            inventory: Arc::new(services::inventory::InventoryService::new(db.clone())),
            orders: Arc::new(services::orders::OrderService::new(db)),
        }
    }
}
