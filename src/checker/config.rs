//! Per-checker configuration.

use crate::path::Path;
use serde::{Deserialize, Serialize};

/// Options controlling how strictly a [`SchemaChecker`](super::SchemaChecker)
/// treats fields the schema does not declare.
///
/// Both toggles default to `false`: undefined attributes are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaCheckerConfig {
    /// Accept undefined top-level attributes and undefined schema URNs.
    pub allow_undefined_attributes: bool,
    /// Accept undefined sub-attributes of complex attributes.
    pub allow_undefined_sub_attributes: bool,
}

impl SchemaCheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_undefined_attributes_allowed(mut self, allow: bool) -> Self {
        self.allow_undefined_attributes = allow;
        self
    }

    pub fn with_undefined_sub_attributes_allowed(mut self, allow: bool) -> Self {
        self.allow_undefined_sub_attributes = allow;
        self
    }

    /// Message for a reference to an attribute the schema does not declare,
    /// or `None` when this configuration tolerates it.
    ///
    /// Paths with more than one segment are worded as sub-attributes.
    pub fn undefined_attribute_issue(&self, prefix: &str, path: &Path) -> Option<String> {
        let last = path.last()?;
        if path.len() > 1 {
            if self.allow_undefined_sub_attributes {
                return None;
            }
            let parent = path.sub_path(path.len() - 1).without_filters();
            return Some(format!(
                "{}Sub-attribute {} is undefined for attribute {}",
                prefix,
                last.attribute(),
                parent
            ));
        }

        if self.allow_undefined_attributes {
            return None;
        }
        Some(match path.schema_urn() {
            Some(urn) => format!(
                "{}Attribute {} is undefined for schema {}",
                prefix,
                last.attribute(),
                urn
            ),
            None => format!("{}Attribute {} is undefined", prefix, last.attribute()),
        })
    }
}
