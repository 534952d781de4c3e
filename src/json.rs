//! Case-insensitive field access on JSON documents.
//!
//! SCIM attribute names are case-insensitive, so every lookup a schema walk
//! makes goes through these helpers rather than `Map::get`. Removal keeps
//! the remaining fields in their original order.

use crate::filter::Filter;
use crate::path::Path;
use serde_json::{Map, Value};

pub(crate) fn field_key(object: &Map<String, Value>, name: &str) -> Option<String> {
    object
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .cloned()
}

pub(crate) fn get_field<'v>(object: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

pub(crate) fn get_field_mut<'v>(
    object: &'v mut Map<String, Value>,
    name: &str,
) -> Option<&'v mut Value> {
    object
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Removes and returns the field, preserving the order of what remains.
pub(crate) fn take_field(object: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = field_key(object, name)?;
    let value = object.get(&key).cloned();
    object.retain(|k, _| k != &key);
    value
}

/// Null or an empty array: no value at all as far as SCIM is concerned.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Get the type name of a JSON value for issue messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Non-empty values found at `path`, honouring value filters on its segments.
///
/// `path` must already be normalized: a schema URN on it names an extension
/// namespace field at the top of `document`.
pub(crate) fn values_at<'v>(document: &'v Value, path: &Path) -> Vec<&'v Value> {
    let start = match (path.schema_urn(), document) {
        (None, _) => Some(document),
        (Some(urn), Value::Object(object)) => get_field(object, urn),
        (Some(_), _) => None,
    };
    let mut current: Vec<&Value> = start.into_iter().collect();

    for segment in path.segments() {
        let mut next = Vec::new();
        for node in current {
            let found: Vec<&Value> = match node {
                Value::Object(object) => {
                    get_field(object, segment.attribute()).into_iter().collect()
                }
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_object())
                    .filter_map(|object| get_field(object, segment.attribute()))
                    .collect(),
                _ => Vec::new(),
            };
            for value in found {
                match (segment.value_filter(), value) {
                    (Some(filter), Value::Array(items)) => {
                        next.extend(items.iter().filter(|item| filter.matches(item)))
                    }
                    (Some(_), _) => {}
                    (None, value) => next.push(value),
                }
            }
        }
        current = next;
    }

    current.into_iter().filter(|v| !is_empty_value(v)).collect()
}

/// Indices of the elements of `items` selected by `filter`.
pub(crate) fn matching_indices(items: &[Value], filter: &Filter) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.matches(item))
        .map(|(i, _)| i)
        .collect()
}
