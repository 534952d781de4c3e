//! Search filter checks.

use crate::common::{account_type, checker, lenient_checker, path, user_type};
use scim_schema_checker::schema::embedded::{ENTERPRISE_USER_SCHEMA_URN, USER_SCHEMA_URN};
use scim_schema_checker::{Filter, ScimError};
use serde_json::json;

#[test]
fn test_undefined_attribute_in_filter() {
    let filter = Filter::pr(path("bogus"));

    let strict = checker(account_type()).check_search(&filter);
    assert_eq!(strict.filter_issues(), ["Attribute bogus is undefined"]);
    assert!(strict.syntax_issues().is_empty());
    match strict.raise_if_any() {
        Err(ScimError::InvalidFilter { message }) => {
            assert_eq!(message, "Attribute bogus is undefined")
        }
        other => panic!("Expected InvalidFilter, got {:?}", other),
    }

    assert!(lenient_checker(account_type()).check_search(&filter).is_empty());
}

#[test]
fn test_filter_matches_create_tolerance() {
    let document = json!({
        "schemas": ["urn:example:params:scim:schemas:core:1.0:Account"],
        "userName": "x",
        "bogus": "y"
    });
    let filter = Filter::eq(path("bogus"), "y");

    let strict = checker(account_type());
    assert_eq!(strict.check_create(&document).syntax_issues().len(), 1);
    assert_eq!(strict.check_search(&filter).filter_issues().len(), 1);

    let lenient = lenient_checker(account_type());
    assert!(lenient.check_create(&document).is_empty());
    assert!(lenient.check_search(&filter).is_empty());
}

#[test]
fn test_qualified_paths() {
    let users = user_type();
    let filter = Filter::and(vec![
        Filter::eq(
            users
                .parse_path(&format!("{}:userName", USER_SCHEMA_URN))
                .unwrap(),
            "bjensen",
        ),
        Filter::eq(
            users
                .parse_path(&format!("{}:employeeNumber", ENTERPRISE_USER_SCHEMA_URN))
                .unwrap(),
            "701984",
        ),
        Filter::pr(path("urn:example:params:scim:schemas:extension:acme:2.0:User:badge")),
    ]);
    let results = checker(users).check_search(&filter);
    assert_eq!(
        results.filter_issues(),
        ["Attribute badge is undefined for schema urn:example:params:scim:schemas:extension:acme:2.0:User"]
    );
}

#[test]
fn test_complex_value_filters() {
    let users = checker(user_type());

    let valid = Filter::or(vec![
        Filter::complex_value(
            path("emails"),
            Filter::and(vec![
                Filter::eq(path("type"), "work"),
                Filter::co(path("value"), "@example.com"),
            ]),
        ),
        Filter::complex_value(path("roles"), Filter::eq(path("type"), "guide")),
        Filter::not(Filter::gt(path("meta.lastModified"), "2011-05-13T04:42:34Z")),
    ]);
    let results = users.check_search(&valid);
    assert!(results.is_empty(), "{:?}", results);

    let invalid = Filter::complex_value(
        path("addresses"),
        Filter::or(vec![Filter::eq(path("zip"), "91608"), Filter::pr(path("name.givenName"))]),
    );
    let results = users.check_search(&invalid);
    assert_eq!(
        results.filter_issues(),
        [
            "Sub-attribute zip is undefined for attribute addresses",
            "Sub-attribute givenName is undefined for attribute addresses.name",
        ]
    );

    let accounts = checker(account_type());
    let implicit = Filter::complex_value(path("aliases"), Filter::sw(path("value"), "ba"));
    assert!(accounts.check_search(&implicit).is_empty());

    // `value` outside a value filter is not a sub-attribute of a simple multi-valued attribute.
    let results = accounts.check_search(&Filter::eq(path("aliases.value"), "babs"));
    assert_eq!(
        results.filter_issues(),
        ["Sub-attribute value is undefined for attribute aliases"]
    );
}
