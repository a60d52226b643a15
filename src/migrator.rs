use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_client_tables::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_order_tables::Migration),
            Box::new(m20240101_000004_create_auth_tables::Migration),
            Box::new(m20240101_000005_seed_roles::Migration),
        ]
    }
}

mod m20240101_000001_create_client_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_client_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Client::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Client::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Client::Name).string().not_null())
                        .col(ColumnDef::new(Client::ClientType).string_len(20).not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Address::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Address::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Address::PersonName).string().not_null())
                        .col(ColumnDef::new(Address::Country).string().not_null())
                        .col(ColumnDef::new(Address::City).string().not_null())
                        .col(ColumnDef::new(Address::Region).string().not_null())
                        .col(ColumnDef::new(Address::Street).string().not_null())
                        .col(ColumnDef::new(Address::BuildingNumber).string().not_null())
                        .col(ColumnDef::new(Address::PostalCode).string().not_null())
                        .col(ColumnDef::new(Address::ClientId).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_address_client_id")
                                .from(Address::Table, Address::ClientId)
                                .to(Client::Table, Client::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Contact::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Contact::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Contact::Name).string().not_null())
                        .col(ColumnDef::new(Contact::Email).string().null())
                        .col(ColumnDef::new(Contact::PhoneNumber).string().null())
                        .col(ColumnDef::new(Contact::ClientId).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_contact_client_id")
                                .from(Contact::Table, Contact::ClientId)
                                .to(Client::Table, Client::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_address_client_id")
                        .table(Address::Table)
                        .col(Address::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_contact_client_id")
                        .table(Contact::Table)
                        .col(Contact::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Contact::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Address::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Client::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Client {
        Table,
        Id,
        Name,
        ClientType,
    }

    #[derive(DeriveIden)]
    enum Address {
        Table,
        Id,
        PersonName,
        Country,
        City,
        Region,
        Street,
        BuildingNumber,
        PostalCode,
        ClientId,
    }

    #[derive(DeriveIden)]
    enum Contact {
        Table,
        Id,
        Name,
        Email,
        PhoneNumber,
        ClientId,
    }
}

mod m20240101_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Category::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Category::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Category::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Category::Slug).string().not_null().unique_key())
                        .col(ColumnDef::new(Category::Description).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Inventory::Description).text().null())
                        .col(ColumnDef::new(Inventory::UnitPrice).big_integer().not_null())
                        .col(ColumnDef::new(Inventory::QuantityType).string_len(20).not_null())
                        .col(ColumnDef::new(Inventory::Units).big_integer().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryCategory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryCategory::InventoryId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryCategory::CategoryId)
                                .big_integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(InventoryCategory::InventoryId)
                                .col(InventoryCategory::CategoryId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_category_inventory_id")
                                .from(InventoryCategory::Table, InventoryCategory::InventoryId)
                                .to(Inventory::Table, Inventory::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_category_category_id")
                                .from(InventoryCategory::Table, InventoryCategory::CategoryId)
                                .to(Category::Table, Category::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_category_category_id")
                        .table(InventoryCategory::Table)
                        .col(InventoryCategory::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryCategory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Category::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Category {
        Table,
        Id,
        Name,
        Slug,
        Description,
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        Name,
        Description,
        UnitPrice,
        QuantityType,
        Units,
    }

    #[derive(DeriveIden)]
    enum InventoryCategory {
        Table,
        InventoryId,
        CategoryId,
    }
}

mod m20240101_000003_create_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderingAddress::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderingAddress::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderingAddress::PersonName).string().not_null())
                        .col(ColumnDef::new(OrderingAddress::Country).string().not_null())
                        .col(ColumnDef::new(OrderingAddress::City).string().not_null())
                        .col(ColumnDef::new(OrderingAddress::Region).string().not_null())
                        .col(ColumnDef::new(OrderingAddress::Street).string().not_null())
                        .col(
                            ColumnDef::new(OrderingAddress::BuildingNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderingAddress::PostalCode).string().not_null())
                        .to_owned(),
                )
                .await?;

            // created_at is assigned by the store at insert time
            manager
                .create_table(
                    Table::create()
                        .table(OrderTable::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderTable::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderTable::ClientId).big_integer().not_null())
                        .col(
                            ColumnDef::new(OrderTable::BillingAddressId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderTable::ShippingAddressId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderTable::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(OrderTable::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_client_id")
                                .from(OrderTable::Table, OrderTable::ClientId)
                                .to(Client::Table, Client::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_billing_address_id")
                                .from(OrderTable::Table, OrderTable::BillingAddressId)
                                .to(OrderingAddress::Table, OrderingAddress::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_shipping_address_id")
                                .from(OrderTable::Table, OrderTable::ShippingAddressId)
                                .to(OrderingAddress::Table, OrderingAddress::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Item::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Item::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Item::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Item::QuantityType).string_len(20).not_null())
                        .col(ColumnDef::new(Item::Units).big_integer().not_null())
                        .col(ColumnDef::new(Item::UnitPrice).big_integer().not_null())
                        .col(ColumnDef::new(Item::InventoryId).big_integer().null())
                        .col(ColumnDef::new(Item::OrderId).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_inventory_id")
                                .from(Item::Table, Item::InventoryId)
                                .to(Inventory::Table, Inventory::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_order_id")
                                .from(Item::Table, Item::OrderId)
                                .to(OrderTable::Table, OrderTable::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_client_id")
                        .table(OrderTable::Table)
                        .col(OrderTable::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_order_id")
                        .table(Item::Table)
                        .col(Item::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Item::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderTable::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderingAddress::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderingAddress {
        Table,
        Id,
        PersonName,
        Country,
        City,
        Region,
        Street,
        BuildingNumber,
        PostalCode,
    }

    #[derive(DeriveIden)]
    enum OrderTable {
        Table,
        Id,
        ClientId,
        BillingAddressId,
        ShippingAddressId,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Item {
        Table,
        Id,
        Name,
        QuantityType,
        Units,
        UnitPrice,
        InventoryId,
        OrderId,
    }

    #[derive(DeriveIden)]
    enum Client {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
    }
}

mod m20240101_000004_create_auth_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_auth_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::Password).text().not_null())
                        .col(
                            ColumnDef::new(Users::Enabled)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Role::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Role::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Role::Name).string().not_null().unique_key())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserRole::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserRole::UserId).big_integer().not_null())
                        .col(ColumnDef::new(UserRole::RoleId).big_integer().not_null())
                        .primary_key(Index::create().col(UserRole::UserId).col(UserRole::RoleId))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_role_user_id")
                                .from(UserRole::Table, UserRole::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_role_role_id")
                                .from(UserRole::Table, UserRole::RoleId)
                                .to(Role::Table, Role::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserRole::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Role::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Email,
        Password,
        Enabled,
    }

    #[derive(DeriveIden)]
    enum Role {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    enum UserRole {
        Table,
        UserId,
        RoleId,
    }
}

mod m20240101_000005_seed_roles {

    use crate::auth::{ROLE_ADMIN, ROLE_INVENTORY, ROLE_SALES};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_seed_roles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let insert = Query::insert()
                .into_table(Role::Table)
                .columns([Role::Name])
                .values_panic([ROLE_SALES.into()])
                .values_panic([ROLE_INVENTORY.into()])
                .values_panic([ROLE_ADMIN.into()])
                .to_owned();

            manager.exec_stmt(insert).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let delete = Query::delete()
                .from_table(Role::Table)
                .and_where(Expr::col(Role::Name).is_in([ROLE_SALES, ROLE_INVENTORY, ROLE_ADMIN]))
                .to_owned();

            manager.exec_stmt(delete).await
        }
    }

    #[derive(DeriveIden)]
    enum Role {
        Table,
        Name,
    }
}
