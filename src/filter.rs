//! Pre-parsed SCIM filter expressions.
//!
//! Filters reach this crate already parsed. [`Filter`] is the AST a parser
//! hands over, and [`FilterVisitor`] is how the checker walks it. The same AST
//! is used for search filters and for value selectors attached to a
//! [`Path`] segment.
//!
//! [`Filter::matches`] evaluates a value selector against one element of a
//! multi-valued attribute. It knows nothing about the schema, so string
//! comparisons are always case-insensitive.

use crate::path::Path;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Binary attribute operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl ComparisonOperator {
    /// The operator keyword used in SCIM filter syntax.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::Contains => "co",
            Self::StartsWith => "sw",
            Self::EndsWith => "ew",
            Self::GreaterThan => "gt",
            Self::GreaterOrEqual => "ge",
            Self::LessThan => "lt",
            Self::LessOrEqual => "le",
        }
    }
}

/// Every node kind a filter AST may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    Equal,
    NotEqual,
    Contains,
    StartsWith,
    EndsWith,
    Present,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    And,
    Or,
    Not,
    ComplexValue,
}

/// A filter expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Comparison {
        operator: ComparisonOperator,
        path: Path,
        value: Value,
    },
    Present {
        path: Path,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    /// `path[filter]`: some element of the multi-valued `path` satisfies `filter`.
    ComplexValue {
        path: Path,
        filter: Box<Filter>,
    },
}

impl Filter {
    pub fn comparison(operator: ComparisonOperator, path: Path, value: impl Into<Value>) -> Self {
        Self::Comparison {
            operator,
            path,
            value: value.into(),
        }
    }

    pub fn eq(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Equal, path, value)
    }

    pub fn ne(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::NotEqual, path, value)
    }

    pub fn co(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Contains, path, value)
    }

    pub fn sw(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::StartsWith, path, value)
    }

    pub fn ew(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::EndsWith, path, value)
    }

    pub fn gt(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::GreaterThan, path, value)
    }

    pub fn ge(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::GreaterOrEqual, path, value)
    }

    pub fn lt(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::LessThan, path, value)
    }

    pub fn le(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::LessOrEqual, path, value)
    }

    pub fn pr(path: Path) -> Self {
        Self::Present { path }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    pub fn complex_value(path: Path, filter: Filter) -> Self {
        Self::ComplexValue {
            path,
            filter: Box::new(filter),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Comparison { operator, .. } => match operator {
                ComparisonOperator::Equal => FilterType::Equal,
                ComparisonOperator::NotEqual => FilterType::NotEqual,
                ComparisonOperator::Contains => FilterType::Contains,
                ComparisonOperator::StartsWith => FilterType::StartsWith,
                ComparisonOperator::EndsWith => FilterType::EndsWith,
                ComparisonOperator::GreaterThan => FilterType::GreaterThan,
                ComparisonOperator::GreaterOrEqual => FilterType::GreaterOrEqual,
                ComparisonOperator::LessThan => FilterType::LessThan,
                ComparisonOperator::LessOrEqual => FilterType::LessOrEqual,
            },
            Self::Present { .. } => FilterType::Present,
            Self::And(_) => FilterType::And,
            Self::Or(_) => FilterType::Or,
            Self::Not(_) => FilterType::Not,
            Self::ComplexValue { .. } => FilterType::ComplexValue,
        }
    }

    /// The attribute path of a leaf or complex-value node.
    pub fn attribute_path(&self) -> Option<&Path> {
        match self {
            Self::Comparison { path, .. }
            | Self::Present { path }
            | Self::ComplexValue { path, .. } => Some(path),
            Self::And(_) | Self::Or(_) | Self::Not(_) => None,
        }
    }

    pub fn visit<V: FilterVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Comparison {
                operator,
                path,
                value,
            } => visitor.visit_comparison(*operator, path, value),
            Self::Present { path } => visitor.visit_present(path),
            Self::And(filters) => visitor.visit_and(filters),
            Self::Or(filters) => visitor.visit_or(filters),
            Self::Not(filter) => visitor.visit_not(filter),
            Self::ComplexValue { path, filter } => visitor.visit_complex_value(path, filter),
        }
    }

    /// Evaluates this filter against one element of a multi-valued attribute.
    pub fn matches(&self, element: &Value) -> bool {
        self.visit(&mut ElementMatcher { element })
    }
}

/// Walks a [`Filter`] AST one node kind at a time.
pub trait FilterVisitor {
    type Output;

    fn visit_comparison(
        &mut self,
        operator: ComparisonOperator,
        path: &Path,
        value: &Value,
    ) -> Self::Output;

    fn visit_present(&mut self, path: &Path) -> Self::Output;

    fn visit_and(&mut self, filters: &[Filter]) -> Self::Output;

    fn visit_or(&mut self, filters: &[Filter]) -> Self::Output;

    fn visit_not(&mut self, filter: &Filter) -> Self::Output;

    fn visit_complex_value(&mut self, path: &Path, filter: &Filter) -> Self::Output;
}

struct ElementMatcher<'a> {
    element: &'a Value,
}

impl ElementMatcher<'_> {
    /// Values addressed by `path` relative to the element, arrays flattened.
    fn resolve(&self, path: &Path) -> Vec<&Value> {
        let Value::Object(_) = self.element else {
            // A simple multi-valued attribute exposes its element as `value`.
            let is_value =
                path.len() == 1 && path.segments()[0].attribute().eq_ignore_ascii_case("value");
            return if is_value { vec![self.element] } else { Vec::new() };
        };

        let mut current = vec![self.element];
        for segment in path.segments() {
            let mut next = Vec::new();
            for node in current {
                let Some(object) = node.as_object() else {
                    continue;
                };
                let found = object
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(segment.attribute()))
                    .map(|(_, value)| value);
                match found {
                    Some(Value::Array(items)) => next.extend(items.iter()),
                    Some(value) => next.push(value),
                    None => {}
                }
            }
            current = next;
        }
        current.into_iter().filter(|v| !v.is_null()).collect()
    }
}

fn compare(operator: ComparisonOperator, actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(e)) => {
            let a = a.to_lowercase();
            let e = e.to_lowercase();
            match operator {
                ComparisonOperator::Equal => a == e,
                ComparisonOperator::NotEqual => a != e,
                ComparisonOperator::Contains => a.contains(&e),
                ComparisonOperator::StartsWith => a.starts_with(&e),
                ComparisonOperator::EndsWith => a.ends_with(&e),
                _ => ordered(operator, a.cmp(&e)),
            }
        }
        (Value::Number(a), Value::Number(e)) => match (a.as_f64(), e.as_f64()) {
            (Some(a), Some(e)) => match a.partial_cmp(&e) {
                Some(ordering) => match operator {
                    ComparisonOperator::Equal => ordering == Ordering::Equal,
                    ComparisonOperator::NotEqual => ordering != Ordering::Equal,
                    ComparisonOperator::Contains
                    | ComparisonOperator::StartsWith
                    | ComparisonOperator::EndsWith => false,
                    _ => ordered(operator, ordering),
                },
                None => false,
            },
            _ => false,
        },
        (Value::Bool(a), Value::Bool(e)) => match operator {
            ComparisonOperator::Equal => a == e,
            ComparisonOperator::NotEqual => a != e,
            _ => false,
        },
        _ => false,
    }
}

fn ordered(operator: ComparisonOperator, ordering: Ordering) -> bool {
    match operator {
        ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
        ComparisonOperator::GreaterOrEqual => ordering != Ordering::Less,
        ComparisonOperator::LessThan => ordering == Ordering::Less,
        ComparisonOperator::LessOrEqual => ordering != Ordering::Greater,
        _ => false,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

impl FilterVisitor for ElementMatcher<'_> {
    type Output = bool;

    fn visit_comparison(
        &mut self,
        operator: ComparisonOperator,
        path: &Path,
        value: &Value,
    ) -> bool {
        let actual = self.resolve(path);
        match (operator, value) {
            (ComparisonOperator::Equal, Value::Null) => actual.is_empty(),
            (ComparisonOperator::NotEqual, Value::Null) => !actual.is_empty(),
            (ComparisonOperator::NotEqual, _) => {
                !actual.iter().any(|a| compare(ComparisonOperator::Equal, a, value))
            }
            _ => actual.iter().any(|a| compare(operator, a, value)),
        }
    }

    fn visit_present(&mut self, path: &Path) -> bool {
        self.resolve(path).into_iter().any(is_present)
    }

    fn visit_and(&mut self, filters: &[Filter]) -> bool {
        filters.iter().all(|f| f.visit(self))
    }

    fn visit_or(&mut self, filters: &[Filter]) -> bool {
        filters.iter().any(|f| f.visit(self))
    }

    fn visit_not(&mut self, filter: &Filter) -> bool {
        !filter.visit(self)
    }

    fn visit_complex_value(&mut self, path: &Path, filter: &Filter) -> bool {
        self.resolve(path).into_iter().any(|v| filter.matches(v))
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, filter: &Filter) -> fmt::Result {
    match filter {
        Filter::And(_) | Filter::Or(_) => write!(f, "({})", filter),
        _ => write!(f, "{}", filter),
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison {
                operator,
                path,
                value,
            } => write!(f, "{} {} {}", path, operator.keyword(), value),
            Self::Present { path } => write!(f, "{} pr", path),
            Self::And(filters) | Self::Or(filters) => {
                let joiner = if matches!(self, Self::And(_)) { " and " } else { " or " };
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    fmt_operand(f, filter)?;
                }
                Ok(())
            }
            Self::Not(filter) => write!(f, "not ({})", filter),
            Self::ComplexValue { path, filter } => write!(f, "{}[{}]", path, filter),
        }
    }
}
