//! Property-based tests for instance-name validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use corral_cli::domain::cluster::validate_instance_name;

proptest! {
    /// Any name matching the documented rule validates.
    #[test]
    fn prop_names_matching_the_rule_validate(name in "[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?") {
        prop_assert!(
            validate_instance_name(&name).is_ok(),
            "rejected valid name: {name}"
        );
    }

    /// Names starting with an uppercase letter are always rejected.
    #[test]
    fn prop_uppercase_names_are_rejected(name in "[A-Z][A-Za-z0-9-]{0,20}") {
        prop_assert!(validate_instance_name(&name).is_err(), "accepted: {name}");
    }

    /// A leading or trailing hyphen is always rejected.
    #[test]
    fn prop_hyphen_edges_are_rejected(core in "[a-z0-9]{0,10}") {
        let leading = format!("-{}", core);
        let trailing = format!("{}-", core);
        prop_assert!(validate_instance_name(&leading).is_err());
        prop_assert!(validate_instance_name(&trailing).is_err());
    }

    /// Names longer than 63 characters are always rejected.
    #[test]
    fn prop_overlong_names_are_rejected(name in "[a-z0-9]{64,80}") {
        prop_assert!(validate_instance_name(&name).is_err(), "accepted: {name}");
    }
}
