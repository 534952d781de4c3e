//! SCIM PATCH operations.
//!
//! [`PatchOperation`] models one RFC 7644 §3.5.2 operation. Besides being the
//! input to [`SchemaChecker::check_modify`](crate::checker::SchemaChecker::check_modify),
//! an operation can be applied to a JSON document. Applying never panics and
//! never returns `Err`: it reports an [`ApplyOutcome`], so a caller can tell
//! "nothing matched" apart from a structurally impossible operation.
//!
//! - `add` with a path sets the attribute, appending to multi-valued
//!   attributes and merging complex ones; without a path it merges the value
//!   object into the resource.
//! - `replace` overwrites the target; complex values merge their
//!   sub-attributes, and elements selected by a value filter are replaced whole.
//! - `remove` deletes the target, or only the elements a value filter selects,
//!   dropping the attribute once no elements remain.

use crate::error::{ScimError, ScimResult};
use crate::json;
use crate::path::{Path, PathSegment};
use crate::schema::ResourceTypeDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The three PATCH operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpType {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for PatchOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        })
    }
}

/// Result of applying one operation to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The target attribute is absent or no element matched the value filter.
    NoTarget,
    /// The operation cannot be applied to a document of this shape.
    Failed(String),
}

/// A single PATCH operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOperation {
    pub op: PatchOpType,
    pub path: Option<Path>,
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpType::Add,
            path,
            value: Some(value),
        }
    }

    pub fn replace(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpType::Replace,
            path,
            value: Some(value),
        }
    }

    pub fn remove(path: Path) -> Self {
        Self {
            op: PatchOpType::Remove,
            path: Some(path),
            value: None,
        }
    }

    /// Reads an operation object such as `{"op": "Add", "path": "title", "value": "x"}`.
    ///
    /// Operation names are matched case-insensitively. Paths are parsed with
    /// [`ResourceTypeDefinition::parse_path`], so they cannot carry value filters.
    pub fn from_json(
        resource_type: &ResourceTypeDefinition,
        operation: &Value,
    ) -> ScimResult<Self> {
        let object = operation
            .as_object()
            .ok_or_else(|| ScimError::invalid_syntax("PATCH operation must be a JSON object"))?;

        let op_name = json::get_field(object, "op")
            .and_then(Value::as_str)
            .ok_or_else(|| ScimError::invalid_syntax("PATCH operation must have 'op' field"))?;
        let op = match op_name.to_ascii_lowercase().as_str() {
            "add" => PatchOpType::Add,
            "remove" => PatchOpType::Remove,
            "replace" => PatchOpType::Replace,
            _ => {
                return Err(ScimError::invalid_syntax(format!(
                    "Unsupported PATCH operation: {}",
                    op_name
                )));
            }
        };

        let path = match json::get_field(object, "path") {
            None | Some(Value::Null) => None,
            Some(Value::String(path)) => Some(resource_type.parse_path(path)?),
            Some(_) => {
                return Err(ScimError::invalid_syntax("PATCH operation 'path' must be a string"));
            }
        };

        Ok(Self {
            op,
            path,
            value: json::get_field(object, "value").cloned(),
        })
    }

    /// A copy whose path no longer carries the core schema URN.
    pub fn normalized(&self, resource_type: &ResourceTypeDefinition) -> Self {
        Self {
            op: self.op,
            path: self.path.as_ref().map(|p| resource_type.normalize_path(p)),
            value: self.value.clone(),
        }
    }

    /// Applies this operation to `document` in place.
    ///
    /// A schema URN on the path is taken to name an extension namespace
    /// field; call [`normalized`](Self::normalized) first for core-qualified paths.
    pub fn apply(&self, document: &mut Value) -> ApplyOutcome {
        let Some(root) = document.as_object_mut() else {
            return ApplyOutcome::Failed("the resource is not a JSON object".to_string());
        };

        let value = match (self.op, &self.value) {
            (PatchOpType::Remove, _) => None,
            (_, Some(value)) => Some(value),
            (op, None) => {
                return ApplyOutcome::Failed(format!("{} operations require a value", op));
            }
        };

        let Some(path) = &self.path else {
            return match (self.op, value) {
                (PatchOpType::Remove, _) => {
                    ApplyOutcome::Failed("remove operations require a path".to_string())
                }
                (op, Some(Value::Object(fields))) => {
                    for (name, field) in fields {
                        merge_field(root, name, field.clone(), op);
                    }
                    ApplyOutcome::Applied
                }
                (op, _) => ApplyOutcome::Failed(format!(
                    "{} operations without a path require a JSON object value",
                    op
                )),
            };
        };

        let target = match path.schema_urn() {
            None => root,
            Some(urn) => {
                if path.is_root() {
                    return apply_to_namespace(root, urn, self.op, value);
                }
                if json::field_key(root, urn).is_none() {
                    if self.op == PatchOpType::Remove {
                        return ApplyOutcome::NoTarget;
                    }
                    root.insert(urn.to_string(), Value::Object(Map::new()));
                }
                match json::get_field_mut(root, urn) {
                    Some(Value::Object(namespace)) => namespace,
                    _ => {
                        return ApplyOutcome::Failed(format!(
                            "extension namespace {} is not a JSON object",
                            urn
                        ));
                    }
                }
            }
        };

        apply_segments(target, path.segments(), self.op, value)
    }
}

fn apply_to_namespace(
    root: &mut Map<String, Value>,
    urn: &str,
    op: PatchOpType,
    value: Option<&Value>,
) -> ApplyOutcome {
    match (op, value) {
        (PatchOpType::Remove, _) => match json::take_field(root, urn) {
            Some(_) => ApplyOutcome::Applied,
            None => ApplyOutcome::NoTarget,
        },
        (op, Some(value @ Value::Object(_))) => {
            merge_field(root, urn, value.clone(), op);
            ApplyOutcome::Applied
        }
        (op, _) => ApplyOutcome::Failed(format!(
            "{} operations on namespace {} require a JSON object value",
            op, urn
        )),
    }
}

fn apply_segments(
    object: &mut Map<String, Value>,
    segments: &[PathSegment],
    op: PatchOpType,
    value: Option<&Value>,
) -> ApplyOutcome {
    let Some((segment, rest)) = segments.split_first() else {
        return ApplyOutcome::NoTarget;
    };
    let name = segment.attribute();
    let existing_key = json::field_key(object, name);

    if let Some(filter) = segment.value_filter() {
        let Some(key) = existing_key else {
            return ApplyOutcome::NoTarget;
        };
        let Some(Value::Array(items)) = object.get_mut(&key) else {
            return ApplyOutcome::NoTarget;
        };
        let matching = json::matching_indices(items, filter);
        if matching.is_empty() {
            return ApplyOutcome::NoTarget;
        }

        if !rest.is_empty() {
            let mut outcome = ApplyOutcome::NoTarget;
            for i in matching {
                if let Value::Object(element) = &mut items[i] {
                    match apply_segments(element, rest, op, value) {
                        ApplyOutcome::Applied => outcome = ApplyOutcome::Applied,
                        ApplyOutcome::NoTarget => {}
                        failed @ ApplyOutcome::Failed(_) => return failed,
                    }
                }
            }
            return outcome;
        }

        match (op, value) {
            (PatchOpType::Remove, _) => {
                let mut index = 0;
                items.retain(|_| {
                    let keep = !matching.contains(&index);
                    index += 1;
                    keep
                });
                if items.is_empty() {
                    object.retain(|k, _| k != &key);
                }
            }
            (PatchOpType::Replace, Some(value)) => {
                for i in matching {
                    items[i] = value.clone();
                }
            }
            (_, Some(value)) => {
                for i in matching {
                    merge_value(&mut items[i], value.clone(), op);
                }
            }
            (_, None) => return ApplyOutcome::Failed(format!("{} operations require a value", op)),
        }
        return ApplyOutcome::Applied;
    }

    if rest.is_empty() {
        return match (op, value) {
            (PatchOpType::Remove, _) => match existing_key {
                Some(key) => {
                    object.retain(|k, _| k != &key);
                    ApplyOutcome::Applied
                }
                None => ApplyOutcome::NoTarget,
            },
            (op, Some(value)) => {
                merge_field(object, name, value.clone(), op);
                ApplyOutcome::Applied
            }
            (op, None) => ApplyOutcome::Failed(format!("{} operations require a value", op)),
        };
    }

    let key = match existing_key {
        Some(key) => key,
        None if op == PatchOpType::Remove => return ApplyOutcome::NoTarget,
        None => {
            object.insert(name.to_string(), Value::Object(Map::new()));
            name.to_string()
        }
    };

    match object.get_mut(&key) {
        Some(Value::Object(child)) => apply_segments(child, rest, op, value),
        Some(Value::Array(items)) => {
            let mut outcome = ApplyOutcome::NoTarget;
            for item in items.iter_mut() {
                if let Value::Object(element) = item {
                    match apply_segments(element, rest, op, value) {
                        ApplyOutcome::Applied => outcome = ApplyOutcome::Applied,
                        ApplyOutcome::NoTarget => {}
                        failed @ ApplyOutcome::Failed(_) => return failed,
                    }
                }
            }
            outcome
        }
        Some(Value::Null) if op == PatchOpType::Remove => ApplyOutcome::NoTarget,
        Some(slot @ Value::Null) => {
            *slot = Value::Object(Map::new());
            match slot {
                Value::Object(child) => apply_segments(child, rest, op, value),
                _ => ApplyOutcome::NoTarget,
            }
        }
        _ => ApplyOutcome::Failed(format!("attribute {} has no sub-attributes", name)),
    }
}

/// Writes `value` into `object[name]` with add or replace semantics.
fn merge_field(object: &mut Map<String, Value>, name: &str, value: Value, op: PatchOpType) {
    let key = json::field_key(object, name).unwrap_or_else(|| name.to_string());
    match object.get_mut(&key) {
        Some(existing) => merge_value(existing, value, op),
        None => {
            object.insert(key, value);
        }
    }
}

fn merge_value(existing: &mut Value, value: Value, op: PatchOpType) {
    match (existing, value) {
        (Value::Array(items), value) if op == PatchOpType::Add => {
            let added = match value {
                Value::Array(added) => added,
                Value::Null => Vec::new(),
                single => vec![single],
            };
            for item in added {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        (Value::Object(fields), Value::Object(updates)) => {
            for (name, update) in updates {
                merge_field(fields, &name, update, op);
            }
        }
        (existing, value) => *existing = value,
    }
}
