//! Property tests for the projector over generated documents.

use crate::common::{account_type, path};
use proptest::prelude::*;
use proptest::sample::select;
use scim_schema_checker::{AttributeProjector, ScimReturnPolicy, SelectionReturnPolicy};
use serde_json::Value;

const NAMES: &[&str] = &[
    "userName", "secret", "secret2", "kind", "name", "givenName", "familyName", "aliases", "id",
    "urn:example:params:scim:schemas:extension:acme:2.0:Account",
];

const SELECTORS: &[&str] = &[
    "userName", "secret2", "kind", "name", "name.givenName", "aliases", "id", "bogus",
];

fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![select(NAMES).prop_map(String::from), "[a-z]{1,6}"]
}

fn field_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(field_name(), inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(field_name(), field_value(), 0..6)
        .prop_map(|fields| Value::Object(fields.into_iter().collect()))
}

fn arb_selector() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(select(SELECTORS), 0..3)
}

/// True when every field of `projected` exists, recursively, in `original`.
fn is_contained_in(projected: &Value, original: &Value) -> bool {
    match (projected, original) {
        (Value::Object(projected), Value::Object(original)) => {
            projected.iter().all(|(name, value)| {
                original
                    .get(name)
                    .is_some_and(|source| is_contained_in(value, source))
            })
        }
        (Value::Array(projected), Value::Array(original)) => {
            projected.len() == original.len()
                && projected
                    .iter()
                    .zip(original)
                    .all(|(value, source)| is_contained_in(value, source))
        }
        (projected, original) => projected == original,
    }
}

proptest! {
    #[test]
    fn projection_never_mutates_or_adds(
        document in arb_document(),
        selected in arb_selector(),
        excluded in any::<bool>(),
    ) {
        let accounts = account_type();
        let paths: Vec<_> = selected.iter().map(|s| path(s)).collect();
        let policy = if excluded {
            ScimReturnPolicy::new(&accounts).with_excluded_attributes(paths)
        } else {
            ScimReturnPolicy::new(&accounts).with_attributes(paths)
        };

        let before = document.clone();
        let projected = AttributeProjector::new(policy).project(&document);
        prop_assert_eq!(&document, &before);
        prop_assert!(is_contained_in(&projected, &document));
    }

    #[test]
    fn empty_selection_keeps_everything(document in arb_document()) {
        let accounts = account_type();
        let policy = SelectionReturnPolicy::including(&accounts, Vec::new());
        let projected = AttributeProjector::new(policy).project(&document);
        prop_assert_eq!(projected, document);
    }
}
