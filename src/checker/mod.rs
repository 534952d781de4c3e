//! Schema checking of create, replace, modify and search requests.
//!
//! A [`SchemaChecker`] is bound to one [`ResourceTypeDefinition`] and a
//! [`SchemaCheckerConfig`]. Each check returns a [`ValidationResults`]
//! holding every issue found; [`ValidationResults::raise_if_any`] turns them
//! into a single [`ScimError`](crate::ScimError).
//!
//! # Examples
//!
//! ```rust
//! use scim_schema_checker::checker::{SchemaChecker, SchemaCheckerConfig};
//! use scim_schema_checker::schema::{ResourceTypeDefinition, SchemaRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let users = Arc::new(ResourceTypeDefinition::user(&registry)?);
//! let checker = SchemaChecker::new(users, SchemaCheckerConfig::default());
//!
//! let results = checker.check_create(&json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "userName": "bjensen"
//! }));
//! results.raise_if_any()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ResourceTypeDefinition`]: crate::schema::ResourceTypeDefinition

pub mod config;
pub mod filter_paths;
pub mod results;
pub mod schema_checker;

pub use config::SchemaCheckerConfig;
pub use filter_paths::FilterPathVisitor;
pub use results::ValidationResults;
pub use schema_checker::SchemaChecker;
