//! Error types for SCIM schema checking.
//!
//! Per-attribute problems found while checking a document are never returned
//! as errors; they are collected in [`ValidationResults`](crate::checker::ValidationResults).
//! [`ScimError`] is what a caller gets when it collapses those results into a
//! single failure, or when a schema or attribute path cannot be built at all.

/// Main error type for SCIM schema checking.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Malformed values, undefined attributes or schema URNs, missing required attributes
    #[error("Invalid syntax: {message}")]
    InvalidSyntax { message: String },

    /// Writes or removals that the attribute's mutability forbids
    #[error("Mutability violation: {message}")]
    Mutability { message: String },

    /// Attribute paths that reference attributes absent from the schema
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// Filters that reference attributes absent from the schema
    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    /// An attribute path string could not be parsed
    #[error("Invalid attribute path '{path}': {reason}")]
    InvalidAttributePath { path: String, reason: String },

    /// A schema or resource type definition is unusable
    #[error("Invalid schema definition: {message}")]
    SchemaDefinition { message: String },

    /// JSON deserialization errors while loading schema definitions
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScimError {
    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Create a mutability error
    pub fn mutability(message: impl Into<String>) -> Self {
        Self::Mutability {
            message: message.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create an error for an unparseable attribute path
    pub fn invalid_attribute_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttributePath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema definition error
    pub fn schema_definition(message: impl Into<String>) -> Self {
        Self::SchemaDefinition {
            message: message.into(),
        }
    }
}

pub type ScimResult<T> = Result<T, ScimError>;
