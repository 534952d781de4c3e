//! Attribute paths addressing locations inside SCIM documents.
//!
//! A [`Path`] is an ordered list of [`PathSegment`]s, optionally qualified by
//! the schema URN of the namespace it starts in. Each segment may carry a
//! value-selector [`Filter`] that picks elements of a multi-valued attribute,
//! as in `emails[type eq "work"].value`.
//!
//! Attribute names and schema URNs are case-insensitive in SCIM, so every
//! comparison helper here ignores ASCII case. Two paths address the same
//! attribute definition when their [`Path::key`]s are equal, which also
//! ignores value filters.

use crate::error::{ScimError, ScimResult};
use crate::filter::Filter;
use std::fmt;
use std::str::FromStr;

const URN_PREFIX: &str = "urn:";

/// One attribute name in a path, with an optional value selector.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    attribute: String,
    value_filter: Option<Filter>,
}

impl PathSegment {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value_filter: None,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value_filter(&self) -> Option<&Filter> {
        self.value_filter.as_ref()
    }

    fn matches_name(&self, other: &PathSegment) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute)
    }
}

/// An address into a SCIM document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    schema_urn: Option<String>,
    segments: Vec<PathSegment>,
}

impl Path {
    /// The document root, unqualified.
    pub fn root() -> Self {
        Self::default()
    }

    /// The root of the namespace identified by `schema_urn`.
    pub fn root_with_schema(schema_urn: impl Into<String>) -> Self {
        Self {
            schema_urn: Some(schema_urn.into()),
            segments: Vec::new(),
        }
    }

    /// A single unqualified attribute, e.g. `userName`.
    pub fn from_attribute(name: impl Into<String>) -> Self {
        Self::root().child(name)
    }

    /// Returns a new path with `name` appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::new(name));
        path
    }

    /// Attaches a value selector to the last segment.
    ///
    /// Has no effect on a root path, which has no segment to select from.
    pub fn with_value_filter(mut self, filter: Filter) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.value_filter = Some(filter);
        }
        self
    }

    /// Resolves `relative` against this path.
    ///
    /// A schema-qualified `relative` path is already absolute and is returned as is.
    pub fn join(&self, relative: &Path) -> Self {
        if relative.schema_urn.is_some() {
            return relative.clone();
        }
        let mut path = self.clone();
        path.segments.extend(relative.segments.iter().cloned());
        path
    }

    pub fn schema_urn(&self) -> Option<&str> {
        self.schema_urn.as_deref()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the path names no attribute (document or namespace root).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The first `len` segments, keeping the schema URN.
    pub fn sub_path(&self, len: usize) -> Self {
        Self {
            schema_urn: self.schema_urn.clone(),
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }

    /// The enclosing path, or `None` for a root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(self.sub_path(self.len() - 1))
        }
    }

    pub fn without_filters(&self) -> Self {
        Self {
            schema_urn: self.schema_urn.clone(),
            segments: self
                .segments
                .iter()
                .map(|s| PathSegment::new(s.attribute.clone()))
                .collect(),
        }
    }

    pub fn without_schema(&self) -> Self {
        Self {
            schema_urn: None,
            segments: self.segments.clone(),
        }
    }

    /// Canonical lookup key: lower-cased, filters stripped.
    pub fn key(&self) -> String {
        let mut key = String::new();
        if let Some(urn) = &self.schema_urn {
            key.push_str(&urn.to_ascii_lowercase());
            if !self.segments.is_empty() {
                key.push(':');
            }
        }
        let names: Vec<String> = self
            .segments
            .iter()
            .map(|s| s.attribute.to_ascii_lowercase())
            .collect();
        key.push_str(&names.join("."));
        key
    }

    /// True when both paths name the same attribute, ignoring case and value filters.
    pub fn same_attribute(&self, other: &Path) -> bool {
        self.same_schema(other)
            && self.len() == other.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.matches_name(b))
    }

    /// True when `other` lies strictly beneath this path.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.same_schema(other)
            && other.len() > self.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.matches_name(b))
    }

    fn same_schema(&self, other: &Path) -> bool {
        match (&self.schema_urn, &other.schema_urn) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

pub(crate) fn is_urn(value: &str) -> bool {
    value.len() > URN_PREFIX.len()
        && value
            .get(..URN_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(URN_PREFIX))
}

fn is_valid_attribute_name(name: &str) -> bool {
    if name == "$ref" {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

/// Parses the dotted attribute part of a path (after any schema URN).
pub(crate) fn parse_segments(input: &str, attributes: &str) -> ScimResult<Vec<PathSegment>> {
    attributes
        .split('.')
        .map(|name| {
            if name.is_empty() {
                Err(ScimError::invalid_attribute_path(input, "empty attribute name"))
            } else if !is_valid_attribute_name(name) {
                Err(ScimError::invalid_attribute_path(
                    input,
                    format!("'{}' is not a valid attribute name", name),
                ))
            } else {
                Ok(PathSegment::new(name))
            }
        })
        .collect()
}

impl FromStr for Path {
    type Err = ScimError;

    /// Parses `attr`, `attr.sub` or `urn:...:attr.sub`.
    ///
    /// The schema URN is everything before the last `:`. Value filters cannot
    /// be written inline; attach them with [`Path::with_value_filter`].
    fn from_str(input: &str) -> ScimResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScimError::invalid_attribute_path(input, "path is empty"));
        }
        if trimmed.contains('[') || trimmed.contains(']') {
            return Err(ScimError::invalid_attribute_path(
                input,
                "value filters are not accepted in path strings",
            ));
        }

        if is_urn(trimmed) {
            let Some((urn, attributes)) = trimmed.rsplit_once(':') else {
                return Err(ScimError::invalid_attribute_path(input, "missing schema URN"));
            };
            return Ok(Self {
                schema_urn: Some(urn.to_string()),
                segments: parse_segments(input, attributes)?,
            });
        }

        Ok(Self {
            schema_urn: None,
            segments: parse_segments(input, trimmed)?,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(urn) = &self.schema_urn {
            f.write_str(urn)?;
            if !self.segments.is_empty() {
                f.write_str(":")?;
            }
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.attribute)?;
            if let Some(filter) = &segment.value_filter {
                write!(f, "[{}]", filter)?;
            }
        }
        Ok(())
    }
}
