//! Issues accumulated by one schema check.

use crate::error::{ScimError, ScimResult};

/// Every violation found by a single check, grouped by category.
///
/// A check never stops at the first problem; callers see all of them at
/// once and decide how to report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    syntax_issues: Vec<String>,
    mutability_issues: Vec<String>,
    path_issues: Vec<String>,
    filter_issues: Vec<String>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Malformed values, undefined attributes and missing required attributes.
    pub fn syntax_issues(&self) -> &[String] {
        &self.syntax_issues
    }

    /// Modifications the attributes' mutability forbids.
    pub fn mutability_issues(&self) -> &[String] {
        &self.mutability_issues
    }

    /// Patch paths referencing undefined attributes.
    pub fn path_issues(&self) -> &[String] {
        &self.path_issues
    }

    /// Filters referencing undefined attributes.
    pub fn filter_issues(&self) -> &[String] {
        &self.filter_issues
    }

    pub fn is_empty(&self) -> bool {
        self.issue_count() == 0
    }

    pub fn issue_count(&self) -> usize {
        self.syntax_issues.len()
            + self.mutability_issues.len()
            + self.path_issues.len()
            + self.filter_issues.len()
    }

    pub(crate) fn add_syntax_issue(&mut self, issue: impl Into<String>) {
        self.syntax_issues.push(issue.into());
    }

    pub(crate) fn add_mutability_issue(&mut self, issue: impl Into<String>) {
        self.mutability_issues.push(issue.into());
    }

    pub(crate) fn add_path_issue(&mut self, issue: impl Into<String>) {
        self.path_issues.push(issue.into());
    }

    pub(crate) fn filter_issues_mut(&mut self) -> &mut Vec<String> {
        &mut self.filter_issues
    }

    /// Moves every issue of `other` into these results, prefixing each message.
    pub(crate) fn absorb(&mut self, prefix: &str, other: ValidationResults) {
        extend_prefixed(&mut self.syntax_issues, prefix, other.syntax_issues);
        extend_prefixed(&mut self.mutability_issues, prefix, other.mutability_issues);
        extend_prefixed(&mut self.path_issues, prefix, other.path_issues);
        extend_prefixed(&mut self.filter_issues, prefix, other.filter_issues);
    }

    /// Collapses the results into at most one error.
    ///
    /// Categories are considered in the order syntax, mutability, path,
    /// filter; the first non-empty one becomes the error, its messages joined
    /// with `", "`.
    pub fn raise_if_any(&self) -> ScimResult<()> {
        if !self.syntax_issues.is_empty() {
            return Err(ScimError::invalid_syntax(self.syntax_issues.join(", ")));
        }
        if !self.mutability_issues.is_empty() {
            return Err(ScimError::mutability(self.mutability_issues.join(", ")));
        }
        if !self.path_issues.is_empty() {
            return Err(ScimError::invalid_path(self.path_issues.join(", ")));
        }
        if !self.filter_issues.is_empty() {
            return Err(ScimError::invalid_filter(self.filter_issues.join(", ")));
        }
        Ok(())
    }
}

fn extend_prefixed(target: &mut Vec<String>, prefix: &str, issues: Vec<String>) {
    for issue in issues {
        target.push(format!("{}{}", prefix, issue));
    }
}
