//! PATCH request checks.

use crate::common::fixtures::{account_with, enterprise_user, group, minimal_user};
use crate::common::{
    account_type, checker, group_type, init_logging, lenient_checker, path, user_type,
};
use scim_schema_checker::schema::embedded::{ENTERPRISE_USER_SCHEMA_URN, USER_SCHEMA_URN};
use scim_schema_checker::{Filter, PatchOpType, PatchOperation, ResourceTypeDefinition, ScimError};
use serde_json::{Value, json};

fn ops(resource_type: &ResourceTypeDefinition, operations: Value) -> Vec<PatchOperation> {
    operations
        .as_array()
        .expect("operations must be an array")
        .iter()
        .map(|op| PatchOperation::from_json(resource_type, op).expect("invalid operation"))
        .collect()
}

#[test]
fn test_valid_operations_have_no_issues() {
    init_logging();
    let users = user_type();
    let operations = ops(
        &users,
        json!([
            {"op": "replace", "path": "displayName", "value": "Barbara"},
            {"op": "add", "path": "emails",
             "value": [{"value": "new@example.com", "type": "other"}]},
            {"op": "remove", "path": "nickName"},
            {"op": "Replace", "path": "name.givenName", "value": "Babs"},
            {"op": "add",
             "value": {"title": "Lead Guide", "roles": [{"value": "guide", "primary": true}]}}
        ]),
    );
    let results = checker(users).check_modify(&operations, Some(&enterprise_user()));
    assert!(results.is_empty(), "Unexpected issues: {:?}", results);
}

#[test]
fn test_removing_required_attribute() {
    let users = user_type();
    let operations = ops(&users, json!([{"op": "remove", "path": "userName"}]));
    let results = checker(users).check_modify(&operations, Some(&minimal_user()));
    assert_eq!(
        results.syntax_issues(),
        ["Patch op[0]: Attribute userName is required and must have a value"]
    );
}

#[test]
fn test_read_only_targets() {
    let users = user_type();
    let operations = ops(
        &users,
        json!([
            {"op": "replace", "path": "id", "value": "other"},
            {"op": "remove", "path": "meta"},
            {"op": "add", "path": "groups", "value": [{"value": "g1"}]}
        ]),
    );
    let results = checker(users).check_modify(&operations, Some(&minimal_user()));
    assert_eq!(results.mutability_issues().len(), 4, "{:?}", results.mutability_issues());
    assert_eq!(
        results.mutability_issues()[0],
        "Patch op[0]: Attribute id is read-only"
    );
    assert_eq!(
        results.mutability_issues()[1],
        "Patch op[1]: Attribute meta is read-only and may not be removed"
    );
    assert!(results.syntax_issues().is_empty());
}

#[test]
fn test_pathless_operations() {
    let users = checker(user_type());

    let bad_value = [PatchOperation::replace(None, json!({"userName": 7}))];
    assert_eq!(
        users.check_modify(&bad_value, None).syntax_issues(),
        ["Patch op[0]: Value for attribute userName must be a string, got integer"]
    );

    let not_an_object = [PatchOperation::add(None, json!("bjensen"))];
    assert_eq!(users.check_modify(&not_an_object, None).syntax_issues().len(), 1);

    let no_path = [PatchOperation {
        op: PatchOpType::Remove,
        path: None,
        value: None,
    }];
    assert_eq!(
        users.check_modify(&no_path, None).path_issues(),
        ["Patch op[0]: Remove operations require a path"]
    );
}

#[test]
fn test_undefined_paths() {
    let users = user_type();
    let operations = ops(
        &users,
        json!([
            {"op": "add", "path": "bogus", "value": "x"},
            {"op": "replace", "path": "name.nickname", "value": "x"}
        ]),
    );

    let results = checker(users.clone()).check_modify(&operations, Some(&minimal_user()));
    assert_eq!(
        results.path_issues(),
        [
            "Patch op[0]: Attribute bogus is undefined",
            "Patch op[1]: Sub-attribute nickname is undefined for attribute name",
        ]
    );
    assert!(matches!(results.raise_if_any(), Err(ScimError::InvalidPath { .. })));

    let lenient = lenient_checker(users).check_modify(&operations, Some(&minimal_user()));
    assert!(lenient.is_empty(), "{:?}", lenient);
}

#[test]
fn test_value_filters() {
    let users = user_type();
    let work_email = path("emails")
        .with_value_filter(Filter::eq(path("type"), "work"))
        .child("value");
    let valid = [PatchOperation::replace(Some(work_email), json!("work@example.com"))];
    let results = checker(users.clone()).check_modify(&valid, Some(&enterprise_user()));
    assert!(results.is_empty(), "{:?}", results);

    let undefined_in_filter = path("emails").with_value_filter(Filter::and(vec![
        Filter::eq(path("type"), "work"),
        Filter::pr(path("label")),
    ]));
    let results = checker(users.clone())
        .check_modify(&[PatchOperation::remove(undefined_in_filter)], Some(&enterprise_user()));
    assert_eq!(
        results.filter_issues(),
        ["Patch op[0]: Sub-attribute label is undefined for attribute emails"]
    );
    assert!(matches!(results.raise_if_any(), Err(ScimError::InvalidFilter { .. })));

    // `value` names each element of a multi-valued attribute without sub-attributes.
    let alias = path("aliases").with_value_filter(Filter::eq(path("value"), "babs"));
    let current = account_with(json!({"aliases": ["babs", "barb"]}));
    let results =
        checker(account_type()).check_modify(&[PatchOperation::remove(alias)], Some(&current));
    assert!(results.is_empty(), "{:?}", results);
}

#[test]
fn test_immutable_members() {
    let groups = group_type();
    let member = "2819c223-7f76-453a-919d-413861904646";
    let member_value = path("members")
        .with_value_filter(Filter::eq(path("value"), member))
        .child("value");

    let replace = [PatchOperation::replace(Some(member_value), json!("someone-else"))];
    let results = checker(groups.clone()).check_modify(&replace, Some(&group()));
    assert_eq!(
        results.mutability_issues(),
        ["Patch op[0]: Attribute members.value is immutable and value(s) may not be replaced"]
    );

    let operations = ops(
        &groups,
        json!([
            {"op": "add", "path": "members", "value": [{"value": "u3", "type": "User"}]},
            {"op": "replace", "path": "displayName", "value": "Senior Tour Guides"}
        ]),
    );
    let results = checker(groups.clone()).check_modify(&operations, Some(&group()));
    assert!(results.is_empty(), "{:?}", results);

    let leave = path("members").with_value_filter(Filter::eq(path("value"), member));
    let results = checker(groups).check_modify(&[PatchOperation::remove(leave)], Some(&group()));
    assert!(results.is_empty(), "{:?}", results);
}

#[test]
fn test_add_to_immutable_attribute_with_a_value() {
    let accounts = account_type();
    let current = account_with(json!({"immutableField": "A", "codes": ["c1"]}));

    let cases = [
        (
            PatchOperation::add(Some(path("immutableField")), json!("B")),
            "Patch op[0]: Attribute immutableField is immutable and value(s) may not be added",
        ),
        (
            PatchOperation::add(Some(path("codes")), json!(["c2"])),
            "Patch op[0]: Attribute codes is immutable and value(s) may not be added",
        ),
        (
            PatchOperation::add(None, json!({"immutableField": "B"})),
            "Patch op[0]: Attribute immutableField is immutable and value(s) may not be added",
        ),
    ];
    for (operation, expected) in cases {
        let results = checker(accounts.clone()).check_modify(&[operation], Some(&current));
        assert_eq!(results.mutability_issues(), [expected]);
        assert!(matches!(results.raise_if_any(), Err(ScimError::Mutability { .. })));
    }

    // Nothing to protect yet, so the first value may be added.
    let first = [PatchOperation::add(Some(path("codes")), json!(["c1"]))];
    let results = checker(accounts).check_modify(&first, Some(&account_with(json!({}))));
    assert!(results.is_empty(), "{:?}", results);
}

#[test]
fn test_extension_namespace_operations() {
    let users = user_type();

    let operations = ops(
        &users,
        json!([{"op": "add", "path": ENTERPRISE_USER_SCHEMA_URN, "value": {"employeeNumber": 5}}]),
    );
    let results = checker(users.clone()).check_modify(&operations, Some(&enterprise_user()));
    assert_eq!(
        results.syntax_issues(),
        [format!(
            "Patch op[0]: Value for attribute {}:employeeNumber must be a string, got integer",
            ENTERPRISE_USER_SCHEMA_URN
        )]
    );

    let department = format!("{}:department", ENTERPRISE_USER_SCHEMA_URN);
    let operations = ops(&users, json!([{"op": "add", "path": department, "value": "Ops"}]));
    let results = checker(users.clone()).check_modify(&operations, Some(&enterprise_user()));
    assert!(results.is_empty(), "{:?}", results);

    // The namespace is created by the patch but never declared in `schemas`.
    let results = checker(users).check_modify(&operations, Some(&minimal_user()));
    assert_eq!(
        results.syntax_issues(),
        [format!(
            "Applying patch ops results in an invalid resource: Extended attributes namespace {} must be included in the schemas attribute",
            ENTERPRISE_USER_SCHEMA_URN
        )]
    );
}

#[test]
fn test_schemas_operations() {
    let users = user_type();

    let drop_core = path("schemas").with_value_filter(Filter::eq(path("value"), USER_SCHEMA_URN));
    let results = checker(users.clone())
        .check_modify(&[PatchOperation::remove(drop_core)], Some(&enterprise_user()));
    assert_eq!(results.mutability_issues().len(), 1, "{:?}", results);
    assert!(results.mutability_issues()[0].contains(USER_SCHEMA_URN));

    let replace = [PatchOperation::replace(
        Some(path("schemas")),
        json!([ENTERPRISE_USER_SCHEMA_URN]),
    )];
    let results = checker(users.clone()).check_modify(&replace, Some(&enterprise_user()));
    assert_eq!(results.mutability_issues().len(), 1, "{:?}", results);

    let add = [PatchOperation::add(
        Some(path("schemas")),
        json!([ENTERPRISE_USER_SCHEMA_URN]),
    )];
    let results = checker(users.clone()).check_modify(&add, Some(&minimal_user()));
    assert!(results.is_empty(), "{:?}", results);

    let drop_extension = path("schemas")
        .with_value_filter(Filter::eq(path("value"), ENTERPRISE_USER_SCHEMA_URN));
    let results = checker(users)
        .check_modify(&[PatchOperation::remove(drop_extension)], Some(&enterprise_user()));
    assert_eq!(
        results.syntax_issues(),
        [format!(
            "Applying patch ops results in an invalid resource: Extended attributes namespace {} must be included in the schemas attribute",
            ENTERPRISE_USER_SCHEMA_URN
        )]
    );
}

#[test]
fn test_failed_apply_is_a_syntax_issue() {
    let users = checker(user_type());
    let mut current = minimal_user();
    current["name"] = json!("Barbara");

    let operation = [PatchOperation::add(Some(path("name.givenName")), json!("Babs"))];
    let results = users.check_modify(&operation, Some(&current));
    let issues = results.syntax_issues();
    assert_eq!(issues.len(), 2, "{:?}", issues);
    assert!(issues[0].starts_with("Patch op[0]: "));
    assert_eq!(
        issues[1],
        "Applying patch ops results in an invalid resource: Value for attribute name must be a JSON object, got string"
    );
}

#[test]
fn test_operations_without_current_resource() {
    let users = user_type();
    let operations = ops(
        &users,
        json!([
            {"op": "replace", "path": "active", "value": "yes"},
            {"op": "replace", "path": "nickName"}
        ]),
    );
    let results = checker(users).check_modify(&operations, None);
    assert_eq!(
        results.syntax_issues(),
        [
            "Patch op[0]: Value for attribute active must be a boolean, got string",
            "Patch op[1]: A value is required for replace operations",
        ]
    );
}
