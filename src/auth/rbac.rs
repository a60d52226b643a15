/*!
 * # Role-Based Access Control
 *
 * The three roles a user can hold and the any-of check the route guards use.
 * `ROLE_ADMIN` satisfies every requirement.
 */

use lazy_static::lazy_static;
use std::collections::HashMap;

pub const ROLE_SALES: &str = "ROLE_SALES";
pub const ROLE_INVENTORY: &str = "ROLE_INVENTORY";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Role definition as seeded into the `role` table
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub description: &'static str,
}

lazy_static! {
    pub static ref ROLES: HashMap<&'static str, RoleDefinition> = {
        let mut roles = HashMap::new();
        roles.insert(
            ROLE_SALES,
            RoleDefinition {
                name: ROLE_SALES,
                description: "Manages clients, their addresses and contacts, and places orders",
            },
        );
        roles.insert(
            ROLE_INVENTORY,
            RoleDefinition {
                name: ROLE_INVENTORY,
                description: "Maintains categories and inventory, reads orders",
            },
        );
        roles.insert(
            ROLE_ADMIN,
            RoleDefinition {
                name: ROLE_ADMIN,
                description: "Full access",
            },
        );
        roles
    };
}

pub fn is_known_role(name: &str) -> bool {
    ROLES.contains_key(name)
}

/// True when `held` contains any of `required`, or the admin role.
pub fn grants_any(held: &[String], required: &[String]) -> bool {
    held.iter()
        .any(|role| role == ROLE_ADMIN || required.iter().any(|needed| needed == role))
}
