//! Property-based tests for request validation and slug derivation.

use opencrm_api::{
    errors::flatten_validation_errors,
    handlers::common::merge_optional,
    services::orders::{CreateOrderRequest, OrderItemRequest},
    slug::Slugifier,
};
use proptest::prelude::*;
use validator::Validate;

fn id_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000
}

fn items_strategy() -> impl Strategy<Value = Vec<OrderItemRequest>> {
    prop::collection::vec(
        (id_strategy(), 1i64..10_000).prop_map(|(inventory_id, units)| OrderItemRequest {
            inventory_id,
            units,
        }),
        0..20,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn positive_ids_and_units_always_validate(
        client_id in id_strategy(),
        billing in id_strategy(),
        shipping in id_strategy(),
        items in items_strategy(),
    ) {
        let request = CreateOrderRequest {
            client_id,
            billing_address_id: billing,
            shipping_address_id: shipping,
            items,
        };
        prop_assert!(request.validate().is_ok());
    }

    #[test]
    fn non_positive_units_are_reported_at_their_index(
        mut items in items_strategy(),
        bad_units in -1_000i64..1,
        position in any::<prop::sample::Index>(),
    ) {
        items.push(OrderItemRequest { inventory_id: 1, units: 1 });
        let index = position.index(items.len());
        items[index].units = bad_units;

        let request = CreateOrderRequest {
            client_id: 1,
            billing_address_id: 1,
            shipping_address_id: 1,
            items,
        };
        let errors = request.validate().unwrap_err();
        prop_assert_eq!(
            flatten_validation_errors(&errors),
            vec![format!("items[{index}].units cannot be smaller than 1")]
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn absent_update_keeps_current_value(current in proptest::option::of("[a-z]{1,20}")) {
        prop_assert_eq!(merge_optional(current.clone(), None), current);
    }

    #[test]
    fn blank_update_clears_value(current in proptest::option::of("[a-z]{1,20}"), blank in "[ \t]{0,5}") {
        prop_assert_eq!(merge_optional(current, Some(blank)), None);
    }

    #[test]
    fn names_differing_only_in_case_and_spacing_share_a_slug(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let slugifier = Slugifier::new();
        let spaced = words.join("   ");
        let shouted = words.join(" ").to_uppercase();
        prop_assert_eq!(slugifier.slugify(&spaced), slugifier.slugify(&shouted));
        prop_assert_eq!(slugifier.slugify(&spaced), words.join("-"));
    }
}
