pub mod addresses;
pub mod categories;
pub mod clients;
pub mod contacts;
pub mod inventory;
pub mod membership;
pub mod orders;
pub mod snapshots;
