pub mod address;
pub mod category;
pub mod client;
pub mod contact;
pub mod inventory;
pub mod inventory_category;
pub mod item;
pub mod order;
pub mod ordering_address;

pub use client::ClientType;
pub use inventory::QuantityType;
pub use order::OrderStatus;

pub mod prelude {
    pub use super::address::Entity as Address;
    pub use super::category::Entity as Category;
    pub use super::client::Entity as Client;
    pub use super::contact::Entity as Contact;
    pub use super::inventory::Entity as Inventory;
    pub use super::inventory_category::Entity as InventoryCategory;
    pub use super::item::Entity as Item;
    pub use super::order::Entity as Order;
    pub use super::ordering_address::Entity as OrderingAddress;
}
