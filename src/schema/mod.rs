//! Schema definitions and the per-resource-type attribute index.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with its attributes
//! - [`SchemaRegistry`] - Registry for loading and looking up schemas
//! - [`ResourceTypeDefinition`] - Core schema plus extensions, indexed by attribute path
//!
//! # Examples
//!
//! ```rust
//! use scim_schema_checker::schema::{ResourceTypeDefinition, SchemaRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let users = ResourceTypeDefinition::user(&registry)?;
//! let path = users.parse_path("name.givenName")?;
//! assert!(users.attribute_definition(&path).is_some());
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod resource_type;
pub mod types;

pub use registry::SchemaRegistry;
pub use resource_type::{
    ResourceTypeDefinition, ResourceTypeDefinitionBuilder, SCHEMAS_ATTRIBUTE, SchemaExtension,
};
pub use types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema};
