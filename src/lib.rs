//! SCIM 2.0 schema checking library for Rust.
//!
//! Validates SCIM resources and PATCH requests against RFC 7643 schemas and
//! shapes responses according to the schema's `returned` characteristics.
//! Every check collects all issues it finds instead of stopping at the first.
//!
//! # Core Components
//!
//! - [`ResourceTypeDefinition`] - Core schema plus extensions, indexed by attribute path
//! - [`SchemaChecker`] - Create, replace, modify and search validation
//! - [`AttributeProjector`] - Response attribute selection
//!
//! # Quick Start
//!
//! ```rust
//! use scim_schema_checker::{
//!     PatchOperation, ResourceTypeDefinition, SchemaChecker, SchemaCheckerConfig, SchemaRegistry,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let users = Arc::new(ResourceTypeDefinition::user(&registry)?);
//! let checker = SchemaChecker::new(users.clone(), SchemaCheckerConfig::default());
//!
//! let current = json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "id": "2819c223",
//!     "userName": "bjensen"
//! });
//! let op = PatchOperation::from_json(
//!     &users,
//!     &json!({"op": "replace", "path": "id", "value": "other"}),
//! )?;
//! let results = checker.check_modify(&[op], Some(&current));
//! assert_eq!(results.mutability_issues().len(), 1);
//! assert!(results.raise_if_any().is_err());
//! # Ok(())
//! # }
//! ```

pub mod checker;
pub mod error;
pub mod filter;
mod json;
pub mod patch;
pub mod path;
pub mod projection;
pub mod schema;

// Re-export commonly used types for convenience
pub use checker::{SchemaChecker, SchemaCheckerConfig, ValidationResults};
pub use error::{ScimError, ScimResult};
pub use filter::{ComparisonOperator, Filter, FilterType, FilterVisitor};
pub use patch::{ApplyOutcome, PatchOpType, PatchOperation};
pub use path::{Path, PathSegment};
pub use projection::{AttributeProjector, ReturnPolicy, ScimReturnPolicy, SelectionReturnPolicy};
pub use schema::{
    AttributeDefinition, AttributeType, Mutability, ResourceTypeDefinition, Returned, Schema,
    SchemaRegistry,
};
