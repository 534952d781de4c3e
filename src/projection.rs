//! Response shaping: which attributes of a resource are returned to a client.
//!
//! An [`AttributeProjector`] walks a response document and keeps the fields
//! its [`ReturnPolicy`] accepts. [`ScimReturnPolicy`] applies the schema's
//! `returned` characteristic together with the request's `attributes` or
//! `excludedAttributes` selector; [`SelectionReturnPolicy`] applies only a
//! selector.
//!
//! # Examples
//!
//! ```rust
//! use scim_schema_checker::projection::{AttributeProjector, ScimReturnPolicy};
//! use scim_schema_checker::schema::{ResourceTypeDefinition, SchemaRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let users = ResourceTypeDefinition::user(&registry)?;
//! let policy = ScimReturnPolicy::from_query(&users, Some("userName"), None)?;
//!
//! let projected = AttributeProjector::new(policy).project(&json!({
//!     "id": "2819c223",
//!     "userName": "bjensen",
//!     "title": "Tour Guide"
//! }));
//! assert_eq!(projected, json!({"id": "2819c223", "userName": "bjensen"}));
//! # Ok(())
//! # }
//! ```

use crate::error::ScimResult;
use crate::path::{self, Path};
use crate::schema::{ResourceTypeDefinition, Returned};
use log::{debug, trace};
use serde_json::{Map, Value};

/// Decides whether the attribute at a path is part of a response.
pub trait ReturnPolicy {
    fn should_return(&self, path: &Path) -> bool;
}

impl<P: ReturnPolicy + ?Sized> ReturnPolicy for &P {
    fn should_return(&self, path: &Path) -> bool {
        (**self).should_return(path)
    }
}

/// Return policy following RFC 7643 `returned` characteristics.
#[derive(Debug, Clone)]
pub struct ScimReturnPolicy<'a> {
    resource_type: &'a ResourceTypeDefinition,
    request_attributes: Vec<Path>,
    query_attributes: Vec<Path>,
    excluded: bool,
}

impl<'a> ScimReturnPolicy<'a> {
    /// A policy with no selector and no request attributes.
    pub fn new(resource_type: &'a ResourceTypeDefinition) -> Self {
        Self {
            resource_type,
            request_attributes: Vec::new(),
            query_attributes: Vec::new(),
            excluded: false,
        }
    }

    /// Builds a policy from the `attributes` and `excludedAttributes` query
    /// parameters, each a comma separated list of attribute paths.
    ///
    /// When both are given, `attributes` wins.
    pub fn from_query(
        resource_type: &'a ResourceTypeDefinition,
        attributes: Option<&str>,
        excluded_attributes: Option<&str>,
    ) -> ScimResult<Self> {
        let policy = Self::new(resource_type);
        match (attributes, excluded_attributes) {
            (Some(attributes), excluded) => {
                if excluded.is_some() {
                    debug!(
                        "Both attributes and excludedAttributes given; ignoring excludedAttributes"
                    );
                }
                Ok(policy.with_attributes(parse_path_list(resource_type, attributes)?))
            }
            (None, Some(excluded)) => {
                Ok(policy.with_excluded_attributes(parse_path_list(resource_type, excluded)?))
            }
            (None, None) => Ok(policy),
        }
    }

    /// Returns only the listed attributes plus those returned `always`.
    pub fn with_attributes(mut self, paths: impl IntoIterator<Item = Path>) -> Self {
        self.query_attributes = self.normalize_all(paths);
        self.excluded = false;
        self
    }

    /// Returns everything by default except the listed attributes.
    pub fn with_excluded_attributes(mut self, paths: impl IntoIterator<Item = Path>) -> Self {
        self.query_attributes = self.normalize_all(paths);
        self.excluded = true;
        self
    }

    /// Attributes present in the write request this response answers.
    pub fn with_request_attributes(mut self, paths: impl IntoIterator<Item = Path>) -> Self {
        self.request_attributes = self.normalize_all(paths);
        self
    }

    /// Collects the request attributes from the write request's body.
    pub fn with_request_document(self, document: &Value) -> Self {
        let mut paths = Vec::new();
        if let Value::Object(object) = document {
            collect_paths(object, &Path::root(), true, &mut paths);
        }
        self.with_request_attributes(paths)
    }

    pub fn query_attributes(&self) -> &[Path] {
        &self.query_attributes
    }

    pub fn request_attributes(&self) -> &[Path] {
        &self.request_attributes
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    fn normalize_all(&self, paths: impl IntoIterator<Item = Path>) -> Vec<Path> {
        paths
            .into_iter()
            .map(|p| self.resource_type.normalize_path(&p).without_filters())
            .collect()
    }
}

impl ReturnPolicy for ScimReturnPolicy<'_> {
    fn should_return(&self, path: &Path) -> bool {
        let path = self.resource_type.normalize_path(path);
        let returned = self
            .resource_type
            .attribute_definition(&path)
            .map(|attribute| attribute.returned)
            .unwrap_or_default();

        match returned {
            Returned::Always => true,
            Returned::Never => false,
            Returned::Request => {
                if self.request_attributes.is_empty() {
                    !self.excluded && path_contains(&self.query_attributes, &path, false)
                } else {
                    self.request_attributes.iter().any(|p| p.same_attribute(&path))
                }
            }
            Returned::Default => {
                if self.excluded {
                    !path_contains(&self.query_attributes, &path, true)
                } else {
                    self.query_attributes.is_empty()
                        || path_contains(&self.query_attributes, &path, false)
                }
            }
        }
    }
}

/// Return policy applying an attribute selector alone, ignoring the schema's
/// `returned` characteristics.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReturnPolicy {
    paths: Vec<Path>,
    excluded: bool,
}

impl SelectionReturnPolicy {
    /// Keeps the listed attributes, their ancestors and descendants.
    ///
    /// An empty list keeps everything.
    pub fn including(
        resource_type: &ResourceTypeDefinition,
        paths: impl IntoIterator<Item = Path>,
    ) -> Self {
        Self {
            paths: normalize(resource_type, paths),
            excluded: false,
        }
    }

    /// Drops the listed attributes and their descendants.
    pub fn excluding(
        resource_type: &ResourceTypeDefinition,
        paths: impl IntoIterator<Item = Path>,
    ) -> Self {
        Self {
            paths: normalize(resource_type, paths),
            excluded: true,
        }
    }
}

impl ReturnPolicy for SelectionReturnPolicy {
    fn should_return(&self, path: &Path) -> bool {
        if self.excluded {
            !path_contains(&self.paths, path, true)
        } else {
            self.paths.is_empty() || path_contains(&self.paths, path, false)
        }
    }
}

/// Produces the returned view of a response document.
#[derive(Debug, Clone)]
pub struct AttributeProjector<P> {
    policy: P,
}

impl<P: ReturnPolicy> AttributeProjector<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns a copy of `document` without the attributes the policy rejects.
    ///
    /// Elements of multi-valued attributes share their attribute's path.
    /// Extension namespace objects are always kept, possibly empty.
    pub fn project(&self, document: &Value) -> Value {
        match document {
            Value::Object(object) => {
                Value::Object(self.project_object(object, &Path::root(), true))
            }
            other => other.clone(),
        }
    }

    fn project_object(
        &self,
        object: &Map<String, Value>,
        parent: &Path,
        top_level: bool,
    ) -> Map<String, Value> {
        let mut projected = Map::new();
        for (name, value) in object {
            if top_level && path::is_urn(name) {
                let namespace = match value {
                    Value::Object(fields) => Value::Object(self.project_object(
                        fields,
                        &Path::root_with_schema(name.as_str()),
                        false,
                    )),
                    other => other.clone(),
                };
                projected.insert(name.clone(), namespace);
                continue;
            }

            let path = parent.child(name.as_str());
            if !self.policy.should_return(&path) {
                trace!("Dropping attribute {} from response", path);
                continue;
            }
            projected.insert(name.clone(), self.project_value(value, &path));
        }
        projected
    }

    fn project_value(&self, value: &Value, path: &Path) -> Value {
        match value {
            Value::Object(object) => Value::Object(self.project_object(object, path, false)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.project_value(item, path))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Membership of `path` in a selector list.
///
/// A listed ancestor always contains `path`. In include mode a listed
/// descendant does too, so the containers of selected sub-attributes survive.
fn path_contains(paths: &[Path], path: &Path, excluded: bool) -> bool {
    paths.iter().any(|listed| {
        listed.same_attribute(path)
            || listed.is_ancestor_of(path)
            || (!excluded && path.is_ancestor_of(listed))
    })
}

fn normalize(
    resource_type: &ResourceTypeDefinition,
    paths: impl IntoIterator<Item = Path>,
) -> Vec<Path> {
    paths
        .into_iter()
        .map(|p| resource_type.normalize_path(&p).without_filters())
        .collect()
}

fn parse_path_list(resource_type: &ResourceTypeDefinition, list: &str) -> ScimResult<Vec<Path>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| resource_type.parse_path(item))
        .collect()
}

fn collect_paths(object: &Map<String, Value>, parent: &Path, top_level: bool, out: &mut Vec<Path>) {
    for (name, value) in object {
        if top_level && path::is_urn(name) {
            if let Value::Object(fields) = value {
                collect_paths(fields, &Path::root_with_schema(name.as_str()), false, out);
            }
            continue;
        }
        let path = parent.child(name.as_str());
        match value {
            Value::Object(fields) => collect_paths(fields, &path, false, out),
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(fields) = item {
                        collect_paths(fields, &path, false, out);
                    }
                }
            }
            _ => {}
        }
        out.push(path);
    }
}
