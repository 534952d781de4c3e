//! Schema registry for loading and accessing SCIM schemas.
//!
//! The registry holds parsed [`Schema`]s keyed by URN. It starts with the
//! embedded core schemas; hosts add their own with [`SchemaRegistry::add_schema`].

use super::embedded;
use super::types::Schema;
use crate::error::{ScimError, ScimResult};

use std::collections::HashMap;

/// Registry of SCIM schemas keyed by lower-cased URN.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the embedded User, Group and Enterprise User schemas.
    pub fn with_embedded_schemas() -> ScimResult<Self> {
        let mut registry = Self::new();
        for content in [
            embedded::core_user_schema(),
            embedded::core_group_schema(),
            embedded::enterprise_user_schema(),
        ] {
            registry.add_schema(Self::load_schema_from_str(content)?);
        }
        Ok(registry)
    }

    /// Load a schema from a JSON string.
    pub fn load_schema_from_str(content: &str) -> ScimResult<Schema> {
        let schema: Schema = serde_json::from_str(content)?;
        if schema.id.trim().is_empty() {
            return Err(ScimError::schema_definition("schema id must not be empty"));
        }
        Ok(schema)
    }

    /// Add a schema, replacing any schema with the same URN.
    pub fn add_schema(&mut self, schema: Schema) {
        log::debug!("Registering schema {}", schema.id);
        self.schemas.insert(schema.id.to_ascii_lowercase(), schema);
    }

    /// Get a schema by URN, ignoring case.
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.schemas.get(&id.to_ascii_lowercase())
    }

    /// Get a schema by URN or fail with a schema definition error.
    pub fn require_schema(&self, id: &str) -> ScimResult<&Schema> {
        self.get_schema(id)
            .ok_or_else(|| ScimError::schema_definition(format!("schema {} is not registered", id)))
    }

    /// Get all registered schemas.
    pub fn get_schemas(&self) -> Vec<&Schema> {
        self.schemas.values().collect()
    }
}
