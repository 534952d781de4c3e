//! Resource type definitions and the attribute index built from them.
//!
//! A [`ResourceTypeDefinition`] pairs a core schema with its extension
//! schemas and the common attributes every resource carries. At construction
//! it flattens all of them into a path-keyed index; after that it is never
//! mutated, so one definition can be shared freely across threads.

use super::embedded::{ENTERPRISE_USER_SCHEMA_URN, GROUP_SCHEMA_URN, USER_SCHEMA_URN};
use super::registry::SchemaRegistry;
use super::types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema};
use crate::error::{ScimError, ScimResult};
use crate::path::{self, Path};
use log::{debug, warn};
use std::collections::HashMap;

/// Name of the top-level attribute listing a resource's schema URNs.
pub const SCHEMAS_ATTRIBUTE: &str = "schemas";

/// An extension schema attached to a resource type.
#[derive(Debug, Clone)]
pub struct SchemaExtension {
    pub schema: Schema,
    pub required: bool,
}

/// A core schema plus extensions, indexed by attribute path.
#[derive(Debug, Clone)]
pub struct ResourceTypeDefinition {
    name: String,
    core_schema: Schema,
    extensions: Vec<SchemaExtension>,
    common_attributes: Vec<AttributeDefinition>,
    schemas_attribute: AttributeDefinition,
    index: HashMap<String, AttributeDefinition>,
}

/// Builder for [`ResourceTypeDefinition`].
#[derive(Debug)]
pub struct ResourceTypeDefinitionBuilder {
    name: String,
    core_schema: Schema,
    extensions: Vec<SchemaExtension>,
}

impl ResourceTypeDefinitionBuilder {
    pub fn extension(mut self, schema: Schema, required: bool) -> Self {
        self.extensions.push(SchemaExtension { schema, required });
        self
    }

    pub fn build(self) -> ScimResult<ResourceTypeDefinition> {
        if !path::is_urn(&self.core_schema.id) {
            return Err(ScimError::schema_definition(format!(
                "core schema id '{}' is not a URN",
                self.core_schema.id
            )));
        }
        for (i, extension) in self.extensions.iter().enumerate() {
            let urn = &extension.schema.id;
            if !path::is_urn(urn) {
                return Err(ScimError::schema_definition(format!(
                    "extension schema id '{}' is not a URN",
                    urn
                )));
            }
            let duplicate = urn.eq_ignore_ascii_case(&self.core_schema.id)
                || self.extensions[..i]
                    .iter()
                    .any(|e| e.schema.id.eq_ignore_ascii_case(urn));
            if duplicate {
                return Err(ScimError::schema_definition(format!(
                    "schema {} is attached to resource type {} more than once",
                    urn, self.name
                )));
            }
        }

        let mut definition = ResourceTypeDefinition {
            name: self.name,
            core_schema: self.core_schema,
            extensions: self.extensions,
            common_attributes: common_attributes(),
            schemas_attribute: schemas_attribute(),
            index: HashMap::new(),
        };
        definition.index = definition.build_index();
        debug!(
            "Built resource type {} with {} indexed attributes",
            definition.name,
            definition.index.len()
        );
        Ok(definition)
    }
}

/// `id`, `externalId` and `meta`, carried by every resource (RFC 7643 §3.1).
fn common_attributes() -> Vec<AttributeDefinition> {
    let read_only = |name: &str, data_type| {
        AttributeDefinition::new(name, data_type).with_mutability(Mutability::ReadOnly)
    };
    vec![
        read_only("id", AttributeType::String)
            .case_exact()
            .with_returned(Returned::Always),
        AttributeDefinition::new("externalId", AttributeType::String).case_exact(),
        read_only("meta", AttributeType::Complex).with_sub_attributes(vec![
            read_only("resourceType", AttributeType::String).case_exact(),
            read_only("created", AttributeType::DateTime),
            read_only("lastModified", AttributeType::DateTime),
            read_only("location", AttributeType::Reference),
            read_only("version", AttributeType::String).case_exact(),
        ]),
    ]
}

fn schemas_attribute() -> AttributeDefinition {
    AttributeDefinition::new(SCHEMAS_ATTRIBUTE, AttributeType::Reference)
        .multi_valued()
        .required()
        .case_exact()
        .with_returned(Returned::Always)
}

fn index_attributes(
    index: &mut HashMap<String, AttributeDefinition>,
    parent: &Path,
    attributes: &[AttributeDefinition],
) {
    for attribute in attributes {
        let path = parent.child(attribute.name.clone());
        if index.insert(path.key(), attribute.clone()).is_some() {
            warn!("Attribute {} is defined more than once; using the last definition", path);
        }
        index_attributes(index, &path, &attribute.sub_attributes);
    }
}

impl ResourceTypeDefinition {
    pub fn builder(name: impl Into<String>, core_schema: Schema) -> ResourceTypeDefinitionBuilder {
        ResourceTypeDefinitionBuilder {
            name: name.into(),
            core_schema,
            extensions: Vec::new(),
        }
    }

    /// The User resource type with the optional Enterprise User extension.
    pub fn user(registry: &SchemaRegistry) -> ScimResult<Self> {
        Self::builder("User", registry.require_schema(USER_SCHEMA_URN)?.clone())
            .extension(registry.require_schema(ENTERPRISE_USER_SCHEMA_URN)?.clone(), false)
            .build()
    }

    /// The Group resource type.
    pub fn group(registry: &SchemaRegistry) -> ScimResult<Self> {
        Self::builder("Group", registry.require_schema(GROUP_SCHEMA_URN)?.clone()).build()
    }

    fn build_index(&self) -> HashMap<String, AttributeDefinition> {
        let mut index = HashMap::new();
        let root = Path::root();
        index.insert(
            Path::from_attribute(SCHEMAS_ATTRIBUTE).key(),
            self.schemas_attribute.clone(),
        );
        index_attributes(&mut index, &root, &self.common_attributes);
        index_attributes(&mut index, &root, &self.core_schema.attributes);
        for extension in &self.extensions {
            let root = Path::root_with_schema(extension.schema.id.clone());
            index_attributes(&mut index, &root, &extension.schema.attributes);
        }
        index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn core_schema(&self) -> &Schema {
        &self.core_schema
    }

    pub fn core_schema_urn(&self) -> &str {
        &self.core_schema.id
    }

    pub fn core_attributes(&self) -> &[AttributeDefinition] {
        &self.core_schema.attributes
    }

    pub fn common_attributes(&self) -> &[AttributeDefinition] {
        &self.common_attributes
    }

    pub fn extensions(&self) -> &[SchemaExtension] {
        &self.extensions
    }

    pub fn extension(&self, urn: &str) -> Option<&SchemaExtension> {
        self.extensions
            .iter()
            .find(|e| e.schema.id.eq_ignore_ascii_case(urn))
    }

    pub fn is_core_schema_urn(&self, urn: &str) -> bool {
        self.core_schema.id.eq_ignore_ascii_case(urn)
    }

    /// Strips the core schema URN so qualified and unqualified core paths coincide.
    pub fn normalize_path(&self, path: &Path) -> Path {
        match path.schema_urn() {
            Some(urn) if self.is_core_schema_urn(urn) => path.without_schema(),
            _ => path.clone(),
        }
    }

    /// Looks up the definition of the attribute `path` addresses.
    ///
    /// Value filters are ignored. `None` only means the schema does not
    /// declare the attribute; whether that is a problem is up to the caller.
    pub fn attribute_definition(&self, path: &Path) -> Option<&AttributeDefinition> {
        if path.is_root() {
            return None;
        }
        self.index.get(&self.normalize_path(path).key())
    }

    /// Parses an attribute path, recognising this resource type's schema URNs.
    ///
    /// A bare extension URN yields the root of that extension's namespace.
    pub fn parse_path(&self, input: &str) -> ScimResult<Path> {
        let trimmed = input.trim();
        let known = std::iter::once(self.core_schema.id.as_str())
            .chain(self.extensions.iter().map(|e| e.schema.id.as_str()));
        for urn in known {
            let Some(head) = trimmed.get(..urn.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(urn) {
                continue;
            }
            let rest = &trimmed[urn.len()..];
            if rest.is_empty() {
                return Ok(Path::root_with_schema(urn));
            }
            if let Some(attributes) = rest.strip_prefix(':') {
                let mut path = Path::root_with_schema(urn);
                for segment in path::parse_segments(input, attributes)? {
                    path = path.child(segment.attribute());
                    if let Some(filter) = segment.value_filter() {
                        path = path.with_value_filter(filter.clone());
                    }
                }
                return Ok(path);
            }
        }
        trimmed.parse()
    }
}
