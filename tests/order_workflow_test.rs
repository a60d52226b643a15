mod common;

use assert_matches::assert_matches;
use common::TestApp;
use opencrm_api::{
    entities::{item, order, ordering_address, OrderStatus},
    errors::ServiceError,
    services::{
        addresses::UpdateAddressRequest,
        inventory::UpdateInventoryRequest,
        orders::{CreateOrderRequest, OrderItemRequest, ITEM_NOT_UNIQUE, ORDER_NOT_FOUND},
        snapshots::INVENTORY_NOT_FOUND,
    },
};
use sea_orm::{EntityTrait, PaginatorTrait};

fn order_for(client_id: i64, address_id: i64, lines: &[(i64, i64)]) -> CreateOrderRequest {
    CreateOrderRequest {
        client_id,
        billing_address_id: address_id,
        shipping_address_id: address_id,
        items: lines
            .iter()
            .map(|&(inventory_id, units)| OrderItemRequest {
                inventory_id,
                units,
            })
            .collect(),
    }
}

async fn row_counts(app: &TestApp) -> (u64, u64, u64) {
    let db = &*app.state.db;
    (
        order::Entity::find().count(db).await.unwrap(),
        item::Entity::find().count(db).await.unwrap(),
        ordering_address::Entity::find().count(db).await.unwrap(),
    )
}

#[tokio::test]
async fn order_snapshots_inventory_and_address_twice() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let address = &client.addresses[0];
    let cable = app.seed_inventory("Copper cable", 100, 40, &[]).await;

    let placed = app
        .services()
        .orders
        .create(order_for(client.id, address.id, &[(cable.id, 3)]))
        .await
        .unwrap();

    assert_eq!(placed.client_id, client.id);
    assert_eq!(placed.status, OrderStatus::Processing);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].units, 3);
    assert_eq!(placed.items[0].unit_price, 100);
    assert_eq!(placed.items[0].name, "Copper cable");
    assert_eq!(placed.items[0].inventory_id, Some(cable.id));

    assert_ne!(placed.billing_address.id, placed.shipping_address.id);
    assert_eq!(placed.billing_address.person_name, address.person_name);
    assert_eq!(placed.shipping_address.postal_code, address.postal_code);
    assert_eq!(
        (
            &placed.billing_address.street,
            &placed.billing_address.city
        ),
        (
            &placed.shipping_address.street,
            &placed.shipping_address.city
        )
    );

    assert_eq!(row_counts(&app).await, (1, 1, 2));
}

#[tokio::test]
async fn later_price_change_does_not_touch_placed_item() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let laptop = app.seed_inventory("Laptop", 120_000, 5, &[]).await;

    let placed = app
        .services()
        .orders
        .create(order_for(client.id, client.addresses[0].id, &[(laptop.id, 1)]))
        .await
        .unwrap();

    app.services()
        .inventory
        .update(
            laptop.id,
            UpdateInventoryRequest {
                unit_price: Some(99_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reread = app.services().orders.get(placed.id).await.unwrap();
    assert_eq!(reread.items[0].unit_price, 120_000);
    // no stock is taken when ordering
    let stock = app.services().inventory.get(laptop.id).await.unwrap();
    assert_eq!(stock.units, 5);
}

#[tokio::test]
async fn later_address_change_does_not_touch_order_copy() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let address = &client.addresses[0];

    let placed = app
        .services()
        .orders
        .create(order_for(client.id, address.id, &[]))
        .await
        .unwrap();

    app.services()
        .addresses
        .update(
            address.id,
            UpdateAddressRequest {
                city: Some("Manchester".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reread = app.services().orders.get(placed.id).await.unwrap();
    assert_eq!(reread.billing_address.city, "London");
    assert_eq!(reread.shipping_address.city, "London");
}

#[tokio::test]
async fn unknown_inventory_aborts_without_rows() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let laptop = app.seed_inventory("Laptop", 1_000, 5, &[]).await;

    let err = app
        .services()
        .orders
        .create(order_for(
            client.id,
            client.addresses[0].id,
            &[(laptop.id, 1), (999, 1)],
        ))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(message) if message == INVENTORY_NOT_FOUND);
    assert_eq!(row_counts(&app).await, (0, 0, 0));
}

#[tokio::test]
async fn unknown_client_or_address_is_not_found() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;

    let missing_client = app
        .services()
        .orders
        .create(order_for(4242, client.addresses[0].id, &[]))
        .await
        .unwrap_err();
    assert_matches!(missing_client, ServiceError::NotFound(message) if message == "Client not found in the database.");

    let mut request = order_for(client.id, client.addresses[0].id, &[]);
    request.shipping_address_id = 777;
    let missing_address = app.services().orders.create(request).await.unwrap_err();
    assert_matches!(missing_address, ServiceError::NotFound(message) if message == "Address not found in the database.");

    assert_eq!(row_counts(&app).await, (0, 0, 0));
}

#[tokio::test]
async fn repeated_item_name_is_not_unique_and_rolls_back() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let laptop = app.seed_inventory("Laptop", 1_000, 5, &[]).await;
    let address_id = client.addresses[0].id;

    app.services()
        .orders
        .create(order_for(client.id, address_id, &[(laptop.id, 1)]))
        .await
        .unwrap();
    let before = row_counts(&app).await;

    let err = app
        .services()
        .orders
        .create(order_for(client.id, address_id, &[(laptop.id, 2)]))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotUnique(message) if message == ITEM_NOT_UNIQUE);
    assert_eq!(row_counts(&app).await, before);
}

#[tokio::test]
async fn items_keep_request_order_on_read() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let mouse = app.seed_inventory("Mouse", 20, 50, &[]).await;
    let keyboard = app.seed_inventory("Keyboard", 45, 30, &[]).await;

    let placed = app
        .services()
        .orders
        .create(order_for(
            client.id,
            client.addresses[0].id,
            &[(keyboard.id, 2), (mouse.id, 4)],
        ))
        .await
        .unwrap();

    let names: Vec<_> = placed.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Keyboard", "Mouse"]);

    let listed = app.services().orders.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], app.services().orders.get(placed.id).await.unwrap());
    let listed_names: Vec<_> = listed[0].items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(listed_names, names);
}

#[tokio::test]
async fn missing_order_is_reported() {
    let app = TestApp::new().await;
    let err = app.services().orders.get(31).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(message) if message == ORDER_NOT_FOUND);
}

#[tokio::test]
async fn deleting_inventory_keeps_item_without_link() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let laptop = app.seed_inventory("Laptop", 1_000, 5, &[]).await;

    let placed = app
        .services()
        .orders
        .create(order_for(client.id, client.addresses[0].id, &[(laptop.id, 1)]))
        .await
        .unwrap();
    app.services().inventory.delete(laptop.id).await.unwrap();

    let reread = app.services().orders.get(placed.id).await.unwrap();
    assert_eq!(reread.items[0].name, "Laptop");
    assert_eq!(reread.items[0].unit_price, 1_000);
    assert_eq!(reread.items[0].inventory_id, None);
}
