//! Core data models for the prefer-map-linter

use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::{sync::Lrc, SourceFile, SourceMap, Span};
use swc_core::ecma::ast::Stmt;

/// A violation detected by a lint rule
#[derive(Debug, Clone)]
pub struct Violation {
    pub rule_id: String,
    pub message: String,
    pub offset: usize,
    pub file_path: String,
    pub severity: Severity,
    pub fix: Option<Fix>,
}

/// A suggested replacement of the byte range `start..end` of the linted source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub description: String,
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// Severity level of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Violation {
    /// Create a new violation without a fix
    pub fn new(
        rule_id: String,
        message: String,
        offset: usize,
        file_path: String,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id,
            message,
            offset,
            file_path,
            severity,
            fix: None,
        }
    }

    /// Create a new violation with a fix
    pub fn with_fix(
        rule_id: String,
        message: String,
        offset: usize,
        file_path: String,
        severity: Severity,
        fix: Fix,
    ) -> Self {
        Self {
            rule_id,
            message,
            offset,
            file_path,
            severity,
            fix: Some(fix),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Context passed to each rule for checking
pub struct RuleContext<'a> {
    pub stmt: &'a Stmt,
    pub file_path: &'a str,
    pub source: &'a str,
    /// Every comment of the file, keyed by the position it is attached to
    pub comments: &'a SingleThreadedComments,
    pub source_map: &'a Lrc<SourceMap>,
    pub source_file: &'a SourceFile,
}

impl RuleContext<'_> {
    /// Byte range of `span` within `source`
    pub fn byte_range(&self, span: Span) -> (usize, usize) {
        let base = self.source_file.start_pos.0;
        let start = span.lo.0.saturating_sub(base) as usize;
        let end = span.hi.0.saturating_sub(base) as usize;
        (start.min(self.source.len()), end.min(self.source.len()))
    }
}

/// Result of linting a single file
#[derive(Debug, Default)]
pub struct LintResult {
    pub file_path: String,
    pub violations: Vec<Violation>,
    pub error: Option<String>,
}

impl LintResult {
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            violations: Vec::new(),
            error: None,
        }
    }

    pub fn with_error(file_path: String, error: String) -> Self {
        Self {
            file_path,
            violations: Vec::new(),
            error: Some(error),
        }
    }

    /// Fixes attached to this file's violations, in report order
    pub fn fixes(&self) -> Vec<&Fix> {
        self.violations.iter().filter_map(|v| v.fix.as_ref()).collect()
    }
}
