//! OpenCRM API Library
//!
//! Clients with addresses and contacts, categorised inventory, and orders
//! that snapshot prices and addresses at the moment they are placed.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod slug;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::HeaderValue,
    routing::{get, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::{AuthConfig, AuthRouterExt, AuthService, ROLE_INVENTORY, ROLE_SALES};
use crate::handlers::AppServices;
use crate::slug::Slugifier;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires every service over one shared pool.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config), db.clone()));
        let services = AppServices::new(db.clone(), Slugifier::new());
        Self {
            db,
            config,
            services,
            auth,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

fn guarded(router: Router<AppState>, secured: bool, roles: &[&str]) -> Router<AppState> {
    if secured {
        router.with_any_role(roles)
    } else {
        router
    }
}

/// Domain routes, each group behind its role guard.
pub fn api_routes(secured: bool) -> Router<AppState> {
    use handlers::{addresses, categories, clients, contacts, inventory, orders};

    let sales = Router::new()
        .route(
            "/client",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/client/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/client/:id/contact", post(clients::create_client_contact))
        .route(
            "/address/:id",
            post(addresses::create_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route(
            "/contact/:id",
            axum::routing::put(contacts::update_contact).delete(contacts::delete_contact),
        );

    let stock = Router::new()
        .route(
            "/category",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/category/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/category-inventory/:slug",
            get(categories::get_category_by_slug),
        )
        .route(
            "/inventory",
            get(inventory::list_inventory).post(inventory::create_inventory),
        )
        .route(
            "/inventory/:id",
            get(inventory::get_inventory)
                .put(inventory::update_inventory)
                .delete(inventory::delete_inventory),
        )
        .route(
            "/inventory/:id/category",
            axum::routing::put(inventory::attach_categories).delete(inventory::detach_categories),
        );

    let orders_read = Router::new()
        .route("/order", get(orders::list_orders))
        .route("/order/:id", get(orders::get_order));

    let orders_create = Router::new().route("/order", post(orders::create_order));

    Router::new()
        .merge(guarded(sales, secured, &[ROLE_SALES]))
        .merge(guarded(stock, secured, &[ROLE_INVENTORY]))
        .merge(guarded(orders_read, secured, &[ROLE_SALES, ROLE_INVENTORY]))
        .merge(guarded(orders_create, secured, &[ROLE_SALES]))
}

/// Full application: domain routes, login, health, docs and the HTTP stack.
pub fn app_router(state: AppState) -> Router {
    let secured = state.config.security_enabled;
    if !secured {
        warn!("security disabled: routes are served without token or role checks");
    }

    Router::new()
        .merge(api_routes(secured))
        .route("/login", post(auth::login_handler))
        .route("/health", get(handlers::health::health_check))
        .merge(openapi::swagger_ui())
        .layer(Extension(state.auth.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Explicit origins win; otherwise permissive CORS only where the config allows it.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}
