mod common;

use assert_matches::assert_matches;
use common::{address, TestApp};
use opencrm_api::{
    entities::{address as address_entity, contact, order, ordering_address, ClientType},
    errors::ServiceError,
    services::{
        clients::{CreateClientRequest, UpdateClientRequest, CLIENT_NOT_FOUND, CLIENT_TO_REMOVE_NOT_FOUND},
        contacts::{CreateContactRequest, UpdateContactRequest, CONTACT_NEEDS_CHANNEL},
        orders::{CreateOrderRequest, OrderItemRequest},
    },
};
use sea_orm::{EntityTrait, PaginatorTrait};

fn contact_with(email: Option<&str>, phone: Option<&str>) -> CreateContactRequest {
    CreateContactRequest {
        name: "Grace".to_string(),
        email: email.map(str::to_string),
        phone_number: phone.map(str::to_string),
    }
}

#[tokio::test]
async fn client_is_created_with_nested_children() {
    let app = TestApp::new().await;

    let created = app
        .services()
        .clients
        .create(CreateClientRequest {
            name: "Babbage".to_string(),
            client_type: "INDIVIDUAL".to_string(),
            addresses: vec![address("Charles Babbage"), address("Georgiana Babbage")],
            contacts: vec![
                contact_with(Some("charles@example.com"), None),
                contact_with(None, Some("+44 20 7946 0001")),
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.client_type, ClientType::Individual);
    assert_eq!(created.addresses.len(), 2);
    assert_eq!(created.contacts.len(), 2);
    assert_eq!(created.contacts[1].email, None);

    let reread = app.services().clients.get(created.id).await.unwrap();
    assert_eq!(reread, created);
    assert_eq!(app.services().clients.list().await.unwrap(), vec![created]);
}

#[tokio::test]
async fn client_update_changes_only_given_fields() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;

    let updated = app
        .services()
        .clients
        .update(
            client.id,
            UpdateClientRequest {
                name: Some("Acme Ltd".to_string()),
                client_type: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Acme Ltd");
    assert_eq!(updated.client_type, ClientType::Organisation);
    assert_eq!(updated.addresses, client.addresses);

    let unknown_type = app
        .services()
        .clients
        .update(
            client.id,
            UpdateClientRequest {
                name: None,
                client_type: Some("COMPANY".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(unknown_type, ServiceError::ValidationFailed(_));
}

#[tokio::test]
async fn deleting_client_removes_everything_it_owns() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let survivor = app.seed_client("Globex").await;
    let laptop = app.seed_inventory("Laptop", 1_000, 5, &[]).await;

    for (owner, line) in [(&client, Some(laptop.id)), (&survivor, None)] {
        app.services()
            .orders
            .create(CreateOrderRequest {
                client_id: owner.id,
                billing_address_id: owner.addresses[0].id,
                shipping_address_id: owner.addresses[0].id,
                items: line
                    .map(|inventory_id| OrderItemRequest {
                        inventory_id,
                        units: 1,
                    })
                    .into_iter()
                    .collect(),
            })
            .await
            .unwrap();
    }

    app.services().clients.delete(client.id).await.unwrap();

    let db = &*app.state.db;
    assert_eq!(address_entity::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(contact::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(order::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(ordering_address::Entity::find().count(db).await.unwrap(), 2);

    let gone = app.services().clients.get(client.id).await.unwrap_err();
    assert_matches!(gone, ServiceError::NotFound(message) if message == CLIENT_NOT_FOUND);

    let twice = app.services().clients.delete(client.id).await.unwrap_err();
    assert_matches!(twice, ServiceError::NotFound(message) if message == CLIENT_TO_REMOVE_NOT_FOUND);
}

#[tokio::test]
async fn address_needs_an_existing_client() {
    let app = TestApp::new().await;

    let err = app
        .services()
        .addresses
        .create(404, address("Nobody"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(message) if message == CLIENT_NOT_FOUND);
    let rows = address_entity::Entity::find()
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn address_lifecycle() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;

    let added = app
        .services()
        .addresses
        .create(client.id, address("Second Office"))
        .await
        .unwrap();
    assert_eq!(added.person_name, "Second Office");

    let reread = app.services().clients.get(client.id).await.unwrap();
    assert_eq!(reread.addresses.len(), 2);

    app.services().addresses.delete(added.id).await.unwrap();
    let missing = app.services().addresses.delete(added.id).await.unwrap_err();
    assert_matches!(missing, ServiceError::NotFound(_));
}

#[tokio::test]
async fn contact_must_keep_a_channel() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;

    let created = app
        .services()
        .contacts
        .create(client.id, contact_with(Some("grace@example.com"), Some("  ")))
        .await
        .unwrap();
    assert_eq!(created.phone_number, None);

    let switched = app
        .services()
        .contacts
        .update(
            created.id,
            UpdateContactRequest {
                phone_number: Some("+44 20 7946 0002".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(switched.email.as_deref(), Some("grace@example.com"));
    assert_eq!(switched.phone_number.as_deref(), Some("+44 20 7946 0002"));

    let contactless = app
        .services()
        .contacts
        .create(client.id, contact_with(Some("only@example.com"), None))
        .await
        .unwrap();
    let err = app
        .services()
        .contacts
        .update(
            contactless.id,
            UpdateContactRequest {
                email: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationFailed(details) if details == vec![CONTACT_NEEDS_CHANNEL.to_string()]);
}
