//! Common test utilities for schema checking tests.

use scim_schema_checker::schema::{
    AttributeDefinition, AttributeType, Mutability, ResourceTypeDefinition, Returned, Schema,
    SchemaRegistry,
};
use scim_schema_checker::{Path, SchemaChecker, SchemaCheckerConfig};
use std::sync::Arc;

pub mod fixtures;

pub const ACCOUNT_SCHEMA_URN: &str = "urn:example:params:scim:schemas:core:1.0:Account";

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::with_embedded_schemas().expect("Failed to load embedded schemas")
}

pub fn user_type() -> Arc<ResourceTypeDefinition> {
    Arc::new(ResourceTypeDefinition::user(&registry()).expect("Failed to build User type"))
}

pub fn group_type() -> Arc<ResourceTypeDefinition> {
    Arc::new(ResourceTypeDefinition::group(&registry()).expect("Failed to build Group type"))
}

/// A resource type whose attributes cover each characteristic once.
pub fn account_type() -> Arc<ResourceTypeDefinition> {
    let schema = Schema::new(
        ACCOUNT_SCHEMA_URN,
        vec![
            AttributeDefinition::new("userName", AttributeType::String).required(),
            AttributeDefinition::new("secret", AttributeType::String)
                .with_mutability(Mutability::ReadOnly),
            AttributeDefinition::new("immutableField", AttributeType::String)
                .with_mutability(Mutability::Immutable),
            AttributeDefinition::new("kind", AttributeType::String)
                .with_canonical_values(["work", "home"]),
            AttributeDefinition::new("exactKind", AttributeType::String)
                .case_exact()
                .with_canonical_values(["work", "home"]),
            AttributeDefinition::new("secret2", AttributeType::String)
                .with_returned(Returned::Never),
            AttributeDefinition::new("name", AttributeType::Complex).with_sub_attributes(vec![
                AttributeDefinition::new("givenName", AttributeType::String),
                AttributeDefinition::new("familyName", AttributeType::String),
            ]),
            AttributeDefinition::new("aliases", AttributeType::String).multi_valued(),
            AttributeDefinition::new("codes", AttributeType::String)
                .multi_valued()
                .with_mutability(Mutability::Immutable),
        ],
    );
    Arc::new(
        ResourceTypeDefinition::builder("Account", schema)
            .build()
            .expect("Failed to build Account type"),
    )
}

pub fn checker(resource_type: Arc<ResourceTypeDefinition>) -> SchemaChecker {
    SchemaChecker::new(resource_type, SchemaCheckerConfig::default())
}

pub fn lenient_checker(resource_type: Arc<ResourceTypeDefinition>) -> SchemaChecker {
    SchemaChecker::new(
        resource_type,
        SchemaCheckerConfig::default()
            .with_undefined_attributes_allowed(true)
            .with_undefined_sub_attributes_allowed(true),
    )
}

pub fn path(s: &str) -> Path {
    s.parse()
        .unwrap_or_else(|e| panic!("Failed to parse path {}: {}", s, e))
}

/// Asserts that exactly one issue in `issues` mentions `needle`.
pub fn assert_one_issue_mentioning(issues: &[String], needle: &str) {
    let matching: Vec<&String> = issues.iter().filter(|i| i.contains(needle)).collect();
    assert_eq!(
        matching.len(),
        1,
        "Expected exactly one issue mentioning '{}', got {:?}",
        needle,
        issues
    );
}
