use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenCRM API",
        version = "0.1.0",
        description = r#"
# OpenCRM API

Clients with their addresses and contacts, an inventory organised in categories,
and orders that keep point-in-time copies of prices and addresses.

## Authentication

Obtain a token from `POST /login` and send it on every other request:

```
Authorization: Bearer <your-jwt-token>
```

Client, address and contact routes need `ROLE_SALES`. Category and inventory routes
need `ROLE_INVENTORY`. Reading orders needs either role; placing one needs `ROLE_SALES`.
`ROLE_ADMIN` passes every check.

## Errors

Failures share one body:

```json
{
  "timestamp": "2024-01-01T00:00:00Z",
  "statusCode": 400,
  "error": "Bad Request",
  "message": "Validation failed with: 2 errors.",
  "details": ["Name cannot be blank", "Units is required"]
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "clients", description = "Clients and their nested data"),
        (name = "addresses", description = "Client addresses"),
        (name = "contacts", description = "Client contacts"),
        (name = "categories", description = "Inventory categories"),
        (name = "inventory", description = "Stocked products"),
        (name = "orders", description = "Order placement and lookup"),
        (name = "health", description = "Service health")
    ),
    paths(
        crate::auth::login_handler,
        crate::handlers::health::health_check,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::get_client,
        crate::handlers::clients::create_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::clients::create_client_contact,
        crate::handlers::addresses::create_address,
        crate::handlers::addresses::update_address,
        crate::handlers::addresses::delete_address,
        crate::handlers::contacts::update_contact,
        crate::handlers::contacts::delete_contact,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::get_category_by_slug,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,
        crate::handlers::inventory::attach_categories,
        crate::handlers::inventory::detach_categories,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
    ),
    components(
        schemas(
            crate::auth::LoginCredentials,
            crate::auth::TokenResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,
            crate::entities::ClientType,
            crate::entities::QuantityType,
            crate::entities::OrderStatus,
            crate::services::clients::ClientView,
            crate::services::clients::CreateClientRequest,
            crate::services::clients::UpdateClientRequest,
            crate::services::addresses::AddressView,
            crate::services::addresses::CreateAddressRequest,
            crate::services::addresses::UpdateAddressRequest,
            crate::services::contacts::ContactView,
            crate::services::contacts::CreateContactRequest,
            crate::services::contacts::UpdateContactRequest,
            crate::services::categories::CategorySummary,
            crate::services::categories::CategoryWithInventories,
            crate::services::categories::CreateCategoryRequest,
            crate::services::categories::UpdateCategoryRequest,
            crate::services::inventory::InventorySummary,
            crate::services::inventory::InventoryWithCategories,
            crate::services::inventory::CreateInventoryRequest,
            crate::services::inventory::UpdateInventoryRequest,
            crate::services::inventory::AttachOrDetachCategoriesRequest,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::OrderItemRequest,
            crate::services::orders::OrderView,
            crate::services::orders::ItemView,
            crate::services::orders::OrderingAddressView,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
