#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use opencrm_api::{
    auth::{ROLE_ADMIN, ROLE_INVENTORY, ROLE_SALES},
    config::AppConfig,
    db,
    handlers::AppServices,
    services::{
        addresses::CreateAddressRequest,
        categories::{CategorySummary, CreateCategoryRequest},
        clients::{ClientView, CreateClientRequest},
        contacts::CreateContactRequest,
        inventory::{CreateInventoryRequest, InventoryWithCategories},
    },
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";
pub const PASSWORD: &str = "correct-horse-battery";

/// Application over a fresh SQLite file with migrations applied and one
/// user per role.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub sales_token: String,
    pub inventory_token: String,
    pub admin_token: String,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_security(true).await
    }

    pub async fn with_security(security_enabled: bool) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("opencrm_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.security_enabled = security_enabled;
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = opencrm_api::app_router(state.clone());

        let sales_token = Self::user_token(&state, "sally", &[ROLE_SALES]).await;
        let inventory_token = Self::user_token(&state, "ivan", &[ROLE_INVENTORY]).await;
        let admin_token = Self::user_token(&state, "ada", &[ROLE_ADMIN]).await;

        Self {
            router,
            state,
            sales_token,
            inventory_token,
            admin_token,
            _dir: dir,
        }
    }

    async fn user_token(state: &AppState, username: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        state
            .auth
            .register_user(username, &format!("{username}@example.com"), PASSWORD, &roles)
            .await
            .expect("register test user");
        state
            .auth
            .login(username, PASSWORD)
            .await
            .expect("log in test user")
            .access_token
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_category(&self, name: &str) -> CategorySummary {
        self.services()
            .categories
            .create(CreateCategoryRequest {
                name: name.to_string(),
                description: None,
            })
            .await
            .expect("seed category")
    }

    pub async fn seed_inventory(
        &self,
        name: &str,
        unit_price: i64,
        units: i64,
        categories_slugs: &[&str],
    ) -> InventoryWithCategories {
        self.services()
            .inventory
            .create(CreateInventoryRequest {
                name: name.to_string(),
                description: None,
                unit_price: Some(unit_price),
                quantity_type: "COUNTABLE".to_string(),
                units: Some(units),
                categories_slugs: categories_slugs.iter().map(|s| s.to_string()).collect(),
            })
            .await
            .expect("seed inventory")
    }

    /// Client with one address and one contact.
    pub async fn seed_client(&self, name: &str) -> ClientView {
        self.services()
            .clients
            .create(CreateClientRequest {
                name: name.to_string(),
                client_type: "ORGANISATION".to_string(),
                addresses: vec![address("Ada Lovelace")],
                contacts: vec![CreateContactRequest {
                    name: "Front desk".to_string(),
                    email: Some(format!("desk@{}.example", name.to_lowercase())),
                    phone_number: None,
                }],
            })
            .await
            .expect("seed client")
    }
}

pub fn address(person_name: &str) -> CreateAddressRequest {
    CreateAddressRequest {
        person_name: person_name.to_string(),
        country: "United Kingdom".to_string(),
        city: "London".to_string(),
        region: "Greater London".to_string(),
        street: "St James's Square".to_string(),
        building_number: "12".to_string(),
        postal_code: "SW1Y 4JH".to_string(),
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is json")
}
