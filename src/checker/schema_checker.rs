//! Schema validation for create, replace, modify and search requests.

use super::config::SchemaCheckerConfig;
use super::filter_paths::FilterPathVisitor;
use super::results::ValidationResults;
use crate::filter::Filter;
use crate::json;
use crate::patch::{ApplyOutcome, PatchOpType, PatchOperation};
use crate::path::{self, Path};
use crate::schema::resource_type::SCHEMAS_ATTRIBUTE;
use crate::schema::{AttributeDefinition, AttributeType, Mutability, ResourceTypeDefinition};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use log::{debug, trace};
use serde_json::{Map, Value, json};
use std::sync::Arc;

const PATCH_RESULT_PREFIX: &str = "Applying patch ops results in an invalid resource: ";

/// How much of a resource a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckMode {
    /// A complete resource (create or replace).
    Full,
    /// A partial document replacing values (patch replace).
    PartialReplace,
    /// A partial document adding values (patch add).
    PartialAdd,
}

impl CheckMode {
    fn for_patch(op: PatchOpType) -> Self {
        match op {
            PatchOpType::Add => Self::PartialAdd,
            PatchOpType::Replace | PatchOpType::Remove => Self::PartialReplace,
        }
    }
}

/// Validates documents and patch requests against one resource type.
///
/// A checker holds no mutable state; one instance can serve any number of
/// concurrent callers, each getting its own [`ValidationResults`].
#[derive(Debug, Clone)]
pub struct SchemaChecker {
    resource_type: Arc<ResourceTypeDefinition>,
    config: SchemaCheckerConfig,
}

impl SchemaChecker {
    pub fn new(resource_type: Arc<ResourceTypeDefinition>, config: SchemaCheckerConfig) -> Self {
        Self {
            resource_type,
            config,
        }
    }

    pub fn resource_type(&self) -> &ResourceTypeDefinition {
        &self.resource_type
    }

    pub fn config(&self) -> SchemaCheckerConfig {
        self.config
    }

    /// Checks a resource submitted for creation.
    pub fn check_create(&self, document: &Value) -> ValidationResults {
        let mut results = ValidationResults::new();
        self.check_resource("", document, None, CheckMode::Full, &mut results);
        debug!(
            "Create check for {} found {} issue(s)",
            self.resource_type.name(),
            results.issue_count()
        );
        results
    }

    /// Checks a full replacement of a resource.
    ///
    /// With `current`, immutable attributes that already hold a value must be
    /// resubmitted unchanged.
    pub fn check_replace(&self, document: &Value, current: Option<&Value>) -> ValidationResults {
        let mut results = ValidationResults::new();
        let current = current.and_then(Value::as_object);
        self.check_resource("", document, current, CheckMode::Full, &mut results);
        debug!(
            "Replace check for {} found {} issue(s)",
            self.resource_type.name(),
            results.issue_count()
        );
        results
    }

    /// Checks a list of patch operations.
    ///
    /// With `current`, every operation that passed its own checks is applied
    /// to a private copy and the outcome is checked as a full replacement,
    /// catching violations only the combined operations produce.
    pub fn check_modify(
        &self,
        operations: &[PatchOperation],
        current: Option<&Value>,
    ) -> ValidationResults {
        let mut results = ValidationResults::new();
        let baseline = current.map(|c| self.remove_read_only_attributes(c));
        let mut working = baseline.clone();

        for (i, operation) in operations.iter().enumerate() {
            let prefix = format!("Patch op[{}]: ", i);
            let operation = operation.normalized(&self.resource_type);
            let before = results.issue_count();
            self.check_patch_operation(&prefix, &operation, baseline.as_ref(), &mut results);

            let Some(document) = working.as_mut() else {
                continue;
            };
            if results.issue_count() != before {
                trace!("{}not applied, it has issues", prefix);
                continue;
            }
            match operation.apply(document) {
                ApplyOutcome::Applied => trace!("{}applied to working copy", prefix),
                ApplyOutcome::NoTarget => trace!("{}matched no target, ignoring", prefix),
                ApplyOutcome::Failed(reason) => {
                    results.add_syntax_issue(format!("{}{}", prefix, reason))
                }
            }
        }

        if let (Some(working), Some(baseline)) = (working, baseline) {
            let mut patched = ValidationResults::new();
            self.check_resource(
                "",
                &working,
                baseline.as_object(),
                CheckMode::Full,
                &mut patched,
            );
            results.absorb(PATCH_RESULT_PREFIX, patched);
        }

        debug!(
            "Modify check of {} operation(s) for {} found {} issue(s)",
            operations.len(),
            self.resource_type.name(),
            results.issue_count()
        );
        results
    }

    /// Checks the attribute paths of a search filter.
    pub fn check_search(&self, filter: &Filter) -> ValidationResults {
        let mut results = ValidationResults::new();
        FilterPathVisitor::unrooted(&self.resource_type, self.config, results.filter_issues_mut())
            .check(filter);
        debug!(
            "Search filter check for {} found {} issue(s)",
            self.resource_type.name(),
            results.issue_count()
        );
        results
    }

    /// Returns a copy of `document` without any read-only attribute.
    ///
    /// Clients often echo server-managed values such as `id` or `meta`; strip
    /// them before [`check_create`](Self::check_create) or
    /// [`check_replace`](Self::check_replace).
    pub fn remove_read_only_attributes(&self, document: &Value) -> Value {
        let mut copy = document.clone();
        if let Some(object) = copy.as_object_mut() {
            let top_level = self
                .resource_type
                .common_attributes()
                .iter()
                .chain(self.resource_type.core_attributes());
            strip_read_only(object, top_level);
            for extension in self.resource_type.extensions() {
                if let Some(Value::Object(namespace)) =
                    json::get_field_mut(object, &extension.schema.id)
                {
                    strip_read_only(namespace, extension.schema.attributes.iter());
                }
            }
        }
        copy
    }

    fn check_resource(
        &self,
        prefix: &str,
        document: &Value,
        current: Option<&Map<String, Value>>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) {
        let Some(object) = document.as_object() else {
            results.add_syntax_issue(format!(
                "{}Resource must be a JSON object, got {}",
                prefix,
                json::value_type_name(document)
            ));
            return;
        };
        let mut remaining = object.clone();

        let schemas = json::take_field(&mut remaining, SCHEMAS_ATTRIBUTE);
        let declared = self.check_schemas(prefix, schemas.as_ref(), mode, results);

        let top_level = self
            .resource_type
            .common_attributes()
            .iter()
            .chain(self.resource_type.core_attributes());
        self.check_attributes(
            prefix,
            &Path::root(),
            top_level,
            &mut remaining,
            current,
            mode,
            results,
        );

        for extension in self.resource_type.extensions() {
            let urn = extension.schema.id.as_str();
            let listed = declared.iter().any(|d| d.eq_ignore_ascii_case(urn));
            let namespace_root = Path::root_with_schema(urn);
            let current_namespace = current
                .and_then(|c| json::get_field(c, urn))
                .and_then(Value::as_object);

            match json::take_field(&mut remaining, urn) {
                None | Some(Value::Null) => {
                    if mode != CheckMode::Full {
                        continue;
                    }
                    if extension.required {
                        results.add_syntax_issue(format!(
                            "{}Extended attributes namespace {} is required for this resource",
                            prefix, urn
                        ));
                    }
                    if listed {
                        self.check_attributes(
                            prefix,
                            &namespace_root,
                            extension.schema.attributes.iter(),
                            &mut Map::new(),
                            current_namespace,
                            mode,
                            results,
                        );
                    }
                }
                Some(Value::Object(mut namespace)) => {
                    if mode == CheckMode::Full && !listed {
                        results.add_syntax_issue(format!(
                            "{}Extended attributes namespace {} must be included in the schemas attribute",
                            prefix, urn
                        ));
                    }
                    self.check_attributes(
                        prefix,
                        &namespace_root,
                        extension.schema.attributes.iter(),
                        &mut namespace,
                        current_namespace,
                        mode,
                        results,
                    );
                    self.check_undefined(prefix, &namespace_root, &namespace, results);
                }
                Some(other) => results.add_syntax_issue(format!(
                    "{}Extended attributes namespace {} must be a JSON object, got {}",
                    prefix,
                    urn,
                    json::value_type_name(&other)
                )),
            }
        }

        for key in remaining.keys() {
            if path::is_urn(key) {
                if !self.config.allow_undefined_attributes {
                    results.add_syntax_issue(format!(
                        "{}Undefined extended attributes namespace {}",
                        prefix, key
                    ));
                }
                continue;
            }
            if let Some(issue) = self
                .config
                .undefined_attribute_issue(prefix, &Path::from_attribute(key.as_str()))
            {
                results.add_syntax_issue(issue);
            }
        }
    }

    /// Checks the `schemas` attribute and returns the URNs it lists.
    fn check_schemas(
        &self,
        prefix: &str,
        schemas: Option<&Value>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) -> Vec<String> {
        let urns: Vec<String> = match schemas {
            None | Some(Value::Null) => {
                if mode == CheckMode::Full {
                    results.add_syntax_issue(format!(
                        "{}Attribute {} is required and must have a value",
                        prefix, SCHEMAS_ATTRIBUTE
                    ));
                }
                return Vec::new();
            }
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item.as_str() {
                    Some(urn) => Some(urn.to_string()),
                    None => {
                        results.add_syntax_issue(format!(
                            "{}Values of attribute {} must be schema URN strings, got {}",
                            prefix,
                            SCHEMAS_ATTRIBUTE,
                            json::value_type_name(item)
                        ));
                        None
                    }
                })
                .collect(),
            Some(other) => {
                results.add_syntax_issue(format!(
                    "{}Attribute {} must be an array of schema URNs, got {}",
                    prefix,
                    SCHEMAS_ATTRIBUTE,
                    json::value_type_name(other)
                ));
                return Vec::new();
            }
        };

        let resource_type = &self.resource_type;
        for urn in &urns {
            let known =
                resource_type.is_core_schema_urn(urn) || resource_type.extension(urn).is_some();
            if !known && !self.config.allow_undefined_attributes {
                results.add_syntax_issue(format!(
                    "{}Schema URN {} is not defined for resource type {}",
                    prefix,
                    urn,
                    resource_type.name()
                ));
            }
        }

        if mode == CheckMode::Full {
            let required = std::iter::once(resource_type.core_schema_urn()).chain(
                resource_type
                    .extensions()
                    .iter()
                    .filter(|e| e.required)
                    .map(|e| e.schema.id.as_str()),
            );
            for urn in required {
                if !urns.iter().any(|u| u.eq_ignore_ascii_case(urn)) {
                    results.add_syntax_issue(format!(
                        "{}Attribute {} must contain the schema URN {}",
                        prefix, SCHEMAS_ATTRIBUTE, urn
                    ));
                }
            }
        }
        urns
    }

    /// Checks every declared attribute, taking the ones found out of `object`.
    ///
    /// Whatever is left in `object` afterwards is undefined.
    #[allow(clippy::too_many_arguments)]
    fn check_attributes<'d>(
        &self,
        prefix: &str,
        parent: &Path,
        attributes: impl Iterator<Item = &'d AttributeDefinition>,
        object: &mut Map<String, Value>,
        current: Option<&Map<String, Value>>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) {
        for attribute in attributes {
            let path = parent.child(attribute.name.clone());
            let node = json::take_field(object, &attribute.name);
            let current_node = current.and_then(|c| json::get_field(c, &attribute.name));

            let node = match node {
                Some(node) if !json::is_empty_value(&node) => node,
                _ => {
                    if attribute.required && mode == CheckMode::Full {
                        results.add_syntax_issue(format!(
                            "{}Attribute {} is required and must have a value",
                            prefix, path
                        ));
                    }
                    continue;
                }
            };

            self.check_mutability(prefix, &path, attribute, &node, current_node, mode, results);
            self.check_value(prefix, &path, attribute, &node, current_node, mode, results);
        }
    }

    fn check_undefined(
        &self,
        prefix: &str,
        parent: &Path,
        remaining: &Map<String, Value>,
        results: &mut ValidationResults,
    ) {
        for key in remaining.keys() {
            if let Some(issue) = self
                .config
                .undefined_attribute_issue(prefix, &parent.child(key.as_str()))
            {
                results.add_syntax_issue(issue);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_mutability(
        &self,
        prefix: &str,
        path: &Path,
        attribute: &AttributeDefinition,
        node: &Value,
        current: Option<&Value>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) {
        match attribute.mutability {
            Mutability::ReadOnly => {
                results.add_mutability_issue(format!("{}Attribute {} is read-only", prefix, path));
            }
            Mutability::Immutable => {
                let Some(current) = current.filter(|c| !json::is_empty_value(c)) else {
                    return;
                };
                match mode {
                    CheckMode::Full if current != node => {
                        results.add_mutability_issue(format!(
                            "{}Attribute {} is immutable and it already has a value",
                            prefix, path
                        ));
                    }
                    CheckMode::Full => {}
                    CheckMode::PartialReplace => results.add_mutability_issue(format!(
                        "{}Attribute {} is immutable and value(s) may not be replaced",
                        prefix, path
                    )),
                    CheckMode::PartialAdd => results.add_mutability_issue(format!(
                        "{}Attribute {} is immutable and value(s) may not be added",
                        prefix, path
                    )),
                }
            }
            Mutability::ReadWrite | Mutability::WriteOnly => {}
        }
    }

    /// Checks the shape of a value: array iff multi-valued, then each element.
    #[allow(clippy::too_many_arguments)]
    fn check_value(
        &self,
        prefix: &str,
        path: &Path,
        attribute: &AttributeDefinition,
        node: &Value,
        current: Option<&Value>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) {
        if !attribute.multi_valued {
            if node.is_array() {
                results.add_syntax_issue(format!(
                    "{}Value for attribute {} must not be an array",
                    prefix, path
                ));
                return;
            }
            self.check_single_value(prefix, path, attribute, node, current, mode, results);
            return;
        }

        let Value::Array(items) = node else {
            results.add_syntax_issue(format!(
                "{}Value for attribute {} must be an array, got {}",
                prefix,
                path,
                json::value_type_name(node)
            ));
            return;
        };
        for item in items {
            if item.is_array() {
                results.add_syntax_issue(format!(
                    "{}Values of attribute {} must not be nested arrays",
                    prefix, path
                ));
                continue;
            }
            self.check_single_value(prefix, path, attribute, item, None, mode, results);
        }
    }

    /// Checks one value against the attribute's data type.
    #[allow(clippy::too_many_arguments)]
    fn check_single_value(
        &self,
        prefix: &str,
        path: &Path,
        attribute: &AttributeDefinition,
        node: &Value,
        current: Option<&Value>,
        mode: CheckMode,
        results: &mut ValidationResults,
    ) {
        if node.is_null() {
            return;
        }
        let wrong_type = |expected: &str| {
            format!(
                "{}Value for attribute {} must be {}, got {}",
                prefix,
                path,
                expected,
                json::value_type_name(node)
            )
        };

        match attribute.data_type {
            AttributeType::String => match node.as_str() {
                Some(value) => self.check_canonical_value(prefix, path, attribute, value, results),
                None => results.add_syntax_issue(wrong_type("a string")),
            },
            AttributeType::Boolean => {
                if !node.is_boolean() {
                    results.add_syntax_issue(wrong_type("a boolean"));
                }
            }
            AttributeType::Decimal => {
                if !node.is_number() {
                    results.add_syntax_issue(wrong_type("a number"));
                }
            }
            AttributeType::Integer => {
                if !(node.is_i64() || node.is_u64()) {
                    results.add_syntax_issue(wrong_type("an integer"));
                }
            }
            AttributeType::DateTime => match node.as_str() {
                Some(value) if is_valid_datetime(value) => {}
                Some(value) => results.add_syntax_issue(format!(
                    "{}Value '{}' for attribute {} is not a valid xsd:dateTime",
                    prefix, value, path
                )),
                None => results.add_syntax_issue(wrong_type("a dateTime string")),
            },
            AttributeType::Binary => match node.as_str() {
                Some(value) if BASE64.decode(value).is_ok() => {}
                Some(_) => results.add_syntax_issue(format!(
                    "{}Value for attribute {} is not valid base64 encoded binary data",
                    prefix, path
                )),
                None => results.add_syntax_issue(wrong_type("a base64 string")),
            },
            AttributeType::Reference => match node.as_str() {
                Some(value) if is_valid_reference(value) => {}
                Some(value) => results.add_syntax_issue(format!(
                    "{}Value '{}' for attribute {} is not a valid URI reference",
                    prefix, value, path
                )),
                None => results.add_syntax_issue(wrong_type("a URI string")),
            },
            AttributeType::Complex => match node.as_object() {
                Some(object) => {
                    let mut remaining = object.clone();
                    self.check_attributes(
                        prefix,
                        path,
                        attribute.sub_attributes.iter(),
                        &mut remaining,
                        current.and_then(Value::as_object),
                        mode,
                        results,
                    );
                    self.check_undefined(prefix, path, &remaining, results);
                }
                None => results.add_syntax_issue(wrong_type("a JSON object")),
            },
        }
    }

    fn check_canonical_value(
        &self,
        prefix: &str,
        path: &Path,
        attribute: &AttributeDefinition,
        value: &str,
        results: &mut ValidationResults,
    ) {
        if attribute.canonical_values.is_empty() {
            return;
        }
        let allowed = attribute.canonical_values.iter().any(|canonical| {
            if attribute.case_exact {
                canonical == value
            } else {
                canonical.to_lowercase() == value.to_lowercase()
            }
        });
        if !allowed {
            results.add_syntax_issue(format!(
                "{}Value '{}' is not valid for attribute {} because it is not one of the canonical values: {}",
                prefix,
                value,
                path,
                attribute.canonical_values.join(", ")
            ));
        }
    }

    fn check_patch_operation(
        &self,
        prefix: &str,
        operation: &PatchOperation,
        current: Option<&Value>,
        results: &mut ValidationResults,
    ) {
        trace!("{}checking {} operation", prefix, operation.op);
        let Some(path) = &operation.path else {
            match (operation.op, &operation.value) {
                (PatchOpType::Remove, _) => {
                    results.add_path_issue(format!("{}Remove operations require a path", prefix))
                }
                (op, Some(value @ Value::Object(_))) => self.check_resource(
                    prefix,
                    value,
                    current.and_then(Value::as_object),
                    CheckMode::for_patch(op),
                    results,
                ),
                (op, _) => results.add_syntax_issue(format!(
                    "{}The value of a {} operation without a path must be a JSON object",
                    prefix, op
                )),
            }
            return;
        };

        if path.is_root() {
            self.check_namespace_operation(prefix, operation, path, current, results);
            return;
        }
        if path.schema_urn().is_none()
            && path.len() == 1
            && path.segments()[0].attribute().eq_ignore_ascii_case(SCHEMAS_ATTRIBUTE)
        {
            self.check_schemas_operation(prefix, operation, path, results);
            return;
        }

        self.check_value_filters(prefix, path, results);

        let Some(attribute) = self.resource_type.attribute_definition(path) else {
            if let Some(issue) = self
                .config
                .undefined_attribute_issue(prefix, &path.without_filters())
            {
                results.add_path_issue(issue);
            }
            return;
        };
        let display_path = path.without_filters();
        let existing = current
            .map(|document| json::values_at(document, path))
            .unwrap_or_default();

        if operation.op == PatchOpType::Remove {
            match attribute.mutability {
                Mutability::ReadOnly => results.add_mutability_issue(format!(
                    "{}Attribute {} is read-only and may not be removed",
                    prefix, display_path
                )),
                Mutability::Immutable if current.is_none() || !existing.is_empty() => {
                    results.add_mutability_issue(format!(
                        "{}Attribute {} is immutable and value(s) may not be removed",
                        prefix, display_path
                    ))
                }
                _ => {}
            }
            let selects_elements = path.last().and_then(|s| s.value_filter()).is_some();
            if attribute.required && !selects_elements {
                results.add_syntax_issue(format!(
                    "{}Attribute {} is required and must have a value",
                    prefix, display_path
                ));
            }
            return;
        }

        let Some(value) = &operation.value else {
            results.add_syntax_issue(format!(
                "{}A value is required for {} operations",
                prefix, operation.op
            ));
            return;
        };

        let mode = CheckMode::for_patch(operation.op);
        let single_existing = match existing.as_slice() {
            [one] if !attribute.multi_valued => Some(*one),
            _ => None,
        };
        self.check_mutability(
            prefix,
            &display_path,
            attribute,
            value,
            single_existing.or(existing.first().copied()),
            mode,
            results,
        );

        let selects_elements = path.last().and_then(|s| s.value_filter()).is_some();
        let element_value = attribute.multi_valued
            && (selects_elements || (operation.op == PatchOpType::Add && !value.is_array()));
        if element_value {
            self.check_single_value(prefix, &display_path, attribute, value, None, mode, results);
        } else {
            self.check_value(
                prefix,
                &display_path,
                attribute,
                value,
                single_existing,
                mode,
                results,
            );
        }
    }

    /// Checks the value filters on a patch path's segments.
    fn check_value_filters(&self, prefix: &str, path: &Path, results: &mut ValidationResults) {
        for (i, segment) in path.segments().iter().enumerate() {
            let Some(filter) = segment.value_filter() else {
                continue;
            };
            let attribute_path = path.sub_path(i + 1).without_filters();
            match self.resource_type.attribute_definition(&attribute_path) {
                Some(attribute) if attribute.multi_valued => {
                    FilterPathVisitor::rooted(
                        &self.resource_type,
                        self.config,
                        attribute_path,
                        results.filter_issues_mut(),
                    )
                    .with_prefix(prefix)
                    .check(filter);
                }
                Some(_) => results.add_path_issue(format!(
                    "{}Attribute {} is not multi-valued and may not have a value filter",
                    prefix, attribute_path
                )),
                None => {}
            }
        }
    }

    /// Operations addressing a whole extension namespace, e.g. `"path": "urn:...:User"`.
    fn check_namespace_operation(
        &self,
        prefix: &str,
        operation: &PatchOperation,
        path: &Path,
        current: Option<&Value>,
        results: &mut ValidationResults,
    ) {
        let urn = path.schema_urn().unwrap_or_default();
        let Some(extension) = self.resource_type.extension(urn) else {
            if !self.config.allow_undefined_attributes {
                results.add_path_issue(format!(
                    "{}Schema {} is not defined for resource type {}",
                    prefix,
                    urn,
                    self.resource_type.name()
                ));
            }
            return;
        };

        match (operation.op, &operation.value) {
            (PatchOpType::Remove, _) => {
                if extension.required {
                    results.add_mutability_issue(format!(
                        "{}Extended attributes namespace {} is required and may not be removed",
                        prefix, urn
                    ));
                }
            }
            (op, Some(Value::Object(namespace))) => {
                let root = Path::root_with_schema(urn);
                let current_namespace = current
                    .and_then(Value::as_object)
                    .and_then(|c| json::get_field(c, urn))
                    .and_then(Value::as_object);
                let mut remaining = namespace.clone();
                self.check_attributes(
                    prefix,
                    &root,
                    extension.schema.attributes.iter(),
                    &mut remaining,
                    current_namespace,
                    CheckMode::for_patch(op),
                    results,
                );
                self.check_undefined(prefix, &root, &remaining, results);
            }
            (op, _) => results.add_syntax_issue(format!(
                "{}The value of a {} operation on namespace {} must be a JSON object",
                prefix, op, urn
            )),
        }
    }

    /// Operations on `schemas` may not drop the core or a required extension URN.
    fn check_schemas_operation(
        &self,
        prefix: &str,
        operation: &PatchOperation,
        path: &Path,
        results: &mut ValidationResults,
    ) {
        let resource_type = &self.resource_type;
        let protected: Vec<&str> = std::iter::once(resource_type.core_schema_urn())
            .chain(
                resource_type
                    .extensions()
                    .iter()
                    .filter(|e| e.required)
                    .map(|e| e.schema.id.as_str()),
            )
            .collect();
        let filter = path.last().and_then(|s| s.value_filter());
        if let Some(filter) = filter {
            FilterPathVisitor::rooted(
                resource_type,
                self.config,
                path.without_filters(),
                results.filter_issues_mut(),
            )
            .with_prefix(prefix)
            .check(filter);
        }

        let dropped: Vec<&str> = match (operation.op, &operation.value) {
            (PatchOpType::Remove, _) => protected
                .into_iter()
                .filter(|urn| filter.is_none_or(|f| f.matches(&json!(urn))))
                .collect(),
            (_, None) => {
                results.add_syntax_issue(format!(
                    "{}A value is required for {} operations",
                    prefix, operation.op
                ));
                return;
            }
            (op, Some(value)) => {
                let urns: Vec<&str> = match value {
                    Value::String(urn) => vec![urn.as_str()],
                    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                    other => {
                        results.add_syntax_issue(format!(
                            "{}Attribute {} must contain schema URN strings, got {}",
                            prefix,
                            SCHEMAS_ATTRIBUTE,
                            json::value_type_name(other)
                        ));
                        return;
                    }
                };
                for urn in &urns {
                    let known = resource_type.is_core_schema_urn(urn)
                        || resource_type.extension(urn).is_some();
                    if !known && !self.config.allow_undefined_attributes {
                        results.add_syntax_issue(format!(
                            "{}Schema URN {} is not defined for resource type {}",
                            prefix,
                            urn,
                            resource_type.name()
                        ));
                    }
                }
                if op == PatchOpType::Replace && filter.is_none() {
                    protected
                        .into_iter()
                        .filter(|p| !urns.iter().any(|u| u.eq_ignore_ascii_case(p)))
                        .collect()
                } else {
                    Vec::new()
                }
            }
        };

        for urn in dropped {
            results.add_mutability_issue(format!(
                "{}Schema URN {} is required for resource type {} and may not be removed from attribute {}",
                prefix,
                urn,
                resource_type.name(),
                SCHEMAS_ATTRIBUTE
            ));
        }
    }
}

fn strip_read_only<'d>(
    object: &mut Map<String, Value>,
    attributes: impl Iterator<Item = &'d AttributeDefinition>,
) {
    for attribute in attributes {
        if attribute.mutability == Mutability::ReadOnly {
            json::take_field(object, &attribute.name);
            continue;
        }
        if attribute.data_type != AttributeType::Complex {
            continue;
        }
        match json::get_field_mut(object, &attribute.name) {
            Some(Value::Object(child)) => strip_read_only(child, attribute.sub_attributes.iter()),
            Some(Value::Array(items)) => {
                for item in items.iter_mut() {
                    if let Value::Object(child) = item {
                        strip_read_only(child, attribute.sub_attributes.iter());
                    }
                }
            }
            _ => {}
        }
    }
}

/// RFC 3339 timestamps; a missing offset is accepted as xsd:dateTime allows.
fn is_valid_datetime(value: &str) -> bool {
    DateTime::<FixedOffset>::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// Absolute URIs and relative references; no whitespace.
fn is_valid_reference(value: &str) -> bool {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match url::Url::parse(value) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse("https://localhost/")
            .and_then(|base| base.join(value))
            .is_ok(),
        Err(_) => false,
    }
}
