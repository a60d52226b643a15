mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp, PASSWORD};
use serde_json::json;

fn client_body() -> serde_json::Value {
    json!({
        "name": "Acme",
        "clientType": "ORGANISATION",
        "addresses": [{
            "personName": "Ada Lovelace",
            "country": "United Kingdom",
            "city": "London",
            "region": "Greater London",
            "street": "St James's Square",
            "buildingNumber": "12",
            "postalCode": "SW1Y 4JH"
        }],
        "contacts": [{ "name": "Front desk", "email": "desk@acme.example" }]
    })
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = TestApp::new().await;

    for uri in ["/client", "/inventory", "/order", "/category"] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let garbage = app
        .request(Method::GET, "/client", None, Some("not-a-token"))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_guard_their_route_groups() {
    let app = TestApp::new().await;

    let sales_on_stock = app
        .request(Method::GET, "/inventory", None, Some(&app.sales_token))
        .await;
    assert_eq!(sales_on_stock.status(), StatusCode::FORBIDDEN);

    let stock_on_clients = app
        .request(Method::GET, "/client", None, Some(&app.inventory_token))
        .await;
    assert_eq!(stock_on_clients.status(), StatusCode::FORBIDDEN);

    let sales_on_clients = app
        .request(Method::GET, "/client", None, Some(&app.sales_token))
        .await;
    assert_eq!(sales_on_clients.status(), StatusCode::OK);

    for uri in ["/client", "/inventory", "/category", "/order"] {
        let response = app.request(Method::GET, uri, None, Some(&app.admin_token)).await;
        assert_eq!(response.status(), StatusCode::OK, "admin on {uri}");
    }
}

#[tokio::test]
async fn orders_are_readable_by_both_roles_but_placed_by_sales() {
    let app = TestApp::new().await;
    let client = app.seed_client("Acme").await;
    let address_id = client.addresses[0].id;
    let order = json!({
        "clientId": client.id,
        "billingAddressId": address_id,
        "shippingAddressId": address_id,
        "items": []
    });

    let by_inventory = app
        .request(Method::POST, "/order", Some(order.clone()), Some(&app.inventory_token))
        .await;
    assert_eq!(by_inventory.status(), StatusCode::FORBIDDEN);

    let by_sales = app
        .request(Method::POST, "/order", Some(order), Some(&app.sales_token))
        .await;
    assert_eq!(by_sales.status(), StatusCode::CREATED);
    let placed = body_json(by_sales).await;
    let order_id = placed["id"].as_i64().unwrap();
    assert_eq!(placed["status"], "PROCESSING");
    assert_eq!(placed["billingAddress"]["city"], "London");

    let listed = app
        .request(Method::GET, "/order", None, Some(&app.inventory_token))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_json(listed).await.as_array().unwrap().len(), 1);

    let fetched = app
        .request(
            Method::GET,
            &format!("/order/{order_id}"),
            None,
            Some(&app.inventory_token),
        )
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn validation_failures_list_every_violation() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/order",
            Some(json!({
                "clientId": 0,
                "billingAddressId": 1,
                "items": [{ "inventoryId": 1, "units": 0 }]
            })),
            Some(&app.sales_token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "Validation failed with: 3 errors.");
    assert_eq!(
        body["details"],
        json!([
            "Client id cannot be smaller than 1",
            "Shipping address id cannot be smaller than 1",
            "items[0].units cannot be smaller than 1"
        ])
    );
}

#[tokio::test]
async fn client_lifecycle_over_http() {
    let app = TestApp::new().await;
    let token = Some(app.sales_token.as_str());

    let created = app
        .request(Method::POST, "/client", Some(client_body()), token)
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["clientType"], "ORGANISATION");
    assert_eq!(created["addresses"][0]["postalCode"], "SW1Y 4JH");

    let contact = app
        .request(
            Method::POST,
            &format!("/client/{id}/contact"),
            Some(json!({ "name": "Billing", "phoneNumber": "+44 20 7946 0003" })),
            token,
        )
        .await;
    assert_eq!(contact.status(), StatusCode::CREATED);

    let updated = app
        .request(
            Method::PUT,
            &format!("/client/{id}"),
            Some(json!({ "name": "Acme Ltd" })),
            token,
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["name"], "Acme Ltd");
    assert_eq!(updated["contacts"].as_array().unwrap().len(), 2);

    let deleted = app
        .request(Method::DELETE, &format!("/client/{id}"), None, token)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .request(Method::GET, &format!("/client/{id}"), None, token)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = body_json(missing).await;
    assert_eq!(body["message"], "Client not found in the database.");
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn non_positive_path_id_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/client/0", None, Some(&app.sales_token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"], json!(["Client id cannot be smaller than 1"]));
}

#[tokio::test]
async fn catalog_over_http() {
    let app = TestApp::new().await;
    let token = Some(app.inventory_token.as_str());

    let category = app
        .request(
            Method::POST,
            "/category",
            Some(json!({ "name": "PC Components" })),
            token,
        )
        .await;
    assert_eq!(category.status(), StatusCode::CREATED);
    assert_eq!(body_json(category).await["slug"], "pc-components");

    let duplicate = app
        .request(
            Method::POST,
            "/category",
            Some(json!({ "name": "PC-Components" })),
            token,
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let inventory = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!({
                "name": "GPU",
                "unitPrice": 50_000,
                "quantityType": "COUNTABLE",
                "units": 4,
                "categoriesSlugs": ["pc-components"]
            })),
            token,
        )
        .await;
    assert_eq!(inventory.status(), StatusCode::CREATED);
    let inventory = body_json(inventory).await;
    assert_eq!(inventory["categories"][0]["slug"], "pc-components");

    let members = app
        .request(Method::GET, "/category-inventory/pc-components", None, token)
        .await;
    assert_eq!(members.status(), StatusCode::OK);
    let members = body_json(members).await;
    assert_eq!(members["inventories"][0]["name"], "GPU");

    let empty_detach = app
        .request(
            Method::DELETE,
            &format!("/inventory/{}/category", inventory["id"]),
            Some(json!({ "categoriesSlugs": [] })),
            token,
        )
        .await;
    assert_eq!(empty_detach.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(empty_detach).await["details"],
        json!(["Categories slugs cannot be empty"])
    );
}

#[tokio::test]
async fn disabled_security_serves_without_tokens() {
    let app = TestApp::with_security(false).await;

    let response = app.request(Method::GET, "/client", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/inventory", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_issues_tokens_for_valid_credentials_only() {
    let app = TestApp::new().await;

    let ok = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "username": "sally", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let token = body_json(ok).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let with_issued = app
        .request(Method::GET, "/client", None, Some(&token))
        .await;
    assert_eq!(with_issued.status(), StatusCode::OK);

    let wrong = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "username": "sally", "password": "nope" })),
            None,
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn non_numeric_path_id_gets_error_body() {
    let app = TestApp::new().await;

    for (uri, token) in [
        ("/client/abc", &app.sales_token),
        ("/inventory/1.5", &app.inventory_token),
        ("/order/first", &app.sales_token),
    ] {
        let response = app.request(Method::GET, uri, None, Some(token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Validation failed with: 1 errors.");
        let detail = body["details"][0].as_str().unwrap();
        assert!(detail.starts_with("Malformed path parameter"), "{detail}");
    }
}

#[tokio::test]
async fn symbol_only_category_name_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/category",
            Some(json!({ "name": "!!!" })),
            Some(&app.inventory_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["details"],
        json!(["Name has to contain at least one letter or digit"])
    );
}
