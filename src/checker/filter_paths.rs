//! Schema checks for the attribute paths inside filter expressions.

use super::config::SchemaCheckerConfig;
use crate::filter::{ComparisonOperator, Filter, FilterVisitor};
use crate::path::Path;
use crate::schema::ResourceTypeDefinition;
use serde_json::Value;

/// Reports every attribute path in a filter that the schema does not declare.
///
/// Unrooted, paths resolve from the document root (search filters). Rooted
/// at a multi-valued attribute, paths resolve relative to it (value
/// selectors and the inside of `attr[...]` expressions).
pub struct FilterPathVisitor<'a> {
    resource_type: &'a ResourceTypeDefinition,
    config: SchemaCheckerConfig,
    root: Option<Path>,
    prefix: &'a str,
    issues: &'a mut Vec<String>,
}

impl<'a> FilterPathVisitor<'a> {
    pub fn unrooted(
        resource_type: &'a ResourceTypeDefinition,
        config: SchemaCheckerConfig,
        issues: &'a mut Vec<String>,
    ) -> Self {
        Self {
            resource_type,
            config,
            root: None,
            prefix: "",
            issues,
        }
    }

    pub fn rooted(
        resource_type: &'a ResourceTypeDefinition,
        config: SchemaCheckerConfig,
        root: Path,
        issues: &'a mut Vec<String>,
    ) -> Self {
        Self {
            resource_type,
            config,
            root: Some(root),
            prefix: "",
            issues,
        }
    }

    /// Starts every issue with `prefix`.
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = prefix;
        self
    }

    /// Walks `filter`, appending an issue per undefined attribute reference.
    pub fn check(&mut self, filter: &Filter) {
        filter.visit(self);
    }

    fn resolve(&self, path: &Path) -> Path {
        match &self.root {
            Some(root) => root.join(path),
            None => path.clone(),
        }
    }

    /// `value` of a multi-valued attribute without sub-attributes names the element itself.
    fn is_implicit_value(&self, path: &Path) -> bool {
        let Some(root) = &self.root else {
            return false;
        };
        let names_value = path.schema_urn().is_none()
            && path.len() == 1
            && path.segments()[0].attribute().eq_ignore_ascii_case("value");
        names_value
            && self
                .resource_type
                .attribute_definition(root)
                .is_some_and(|attribute| attribute.is_simple_multi_valued())
    }

    fn check_path(&mut self, path: &Path) {
        if self.is_implicit_value(path) {
            return;
        }
        let full = self.resolve(path);
        if self.resource_type.attribute_definition(&full).is_none() {
            let issue = self
                .config
                .undefined_attribute_issue(self.prefix, &full.without_filters());
            if let Some(issue) = issue {
                self.issues.push(issue);
            }
        }
    }
}

impl FilterVisitor for FilterPathVisitor<'_> {
    type Output = ();

    fn visit_comparison(&mut self, _operator: ComparisonOperator, path: &Path, _value: &Value) {
        self.check_path(path);
    }

    fn visit_present(&mut self, path: &Path) {
        self.check_path(path);
    }

    fn visit_and(&mut self, filters: &[Filter]) {
        for filter in filters {
            filter.visit(self);
        }
    }

    fn visit_or(&mut self, filters: &[Filter]) {
        for filter in filters {
            filter.visit(self);
        }
    }

    fn visit_not(&mut self, filter: &Filter) {
        filter.visit(self);
    }

    fn visit_complex_value(&mut self, path: &Path, filter: &Filter) {
        self.check_path(path);
        let nested_root = self.resolve(path).without_filters();
        let mut nested = FilterPathVisitor {
            resource_type: self.resource_type,
            config: self.config,
            root: Some(nested_root),
            prefix: self.prefix,
            issues: &mut *self.issues,
        };
        filter.visit(&mut nested);
    }
}
