//! PMAP001: Prefer Map Function
//!
//! Detects `for ... of` loops whose only job is to push one value per element
//! onto another array, and suggests a `map` call instead.
//!
//! Bad:
//! ```js
//! for (const el of input) {
//!     const x = el * 2;
//!     output.push(x);
//! }
//! ```
//!
//! Good:
//! ```js
//! output = input.map(el => {
//!     const x = el * 2;
//!     return x;
//! });
//! ```
//!
//! With `use_concat`, the suggestion keeps what `output` already holds:
//! ```js
//! output = output.concat(input.map(el => el * 2));
//! ```
//!
//! Only the last statement of the loop body is inspected. Loops that `break`
//! early or push in several places are still reported.

use crate::idiom::render::{carried_comments, indent_continuation, line_indent};
use crate::idiom::rewriter::build_replacement;
use crate::idiom::{extract, matches, render_stmt};
use crate::models::{Fix, RuleContext, Severity, Violation};
use crate::rules::base::LintRule;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{ForOfStmt, Stmt};

pub const RULE_ID: &str = "PMAP001";
pub const RULE_NAME: &str = "prefer-map-function";
pub const FAILURE_MESSAGE: &str = "Expected a map-function instead of a for-each loop";
pub const RATIONALE: &str = "A map function reduces the complexity of code.";

pub struct PreferMapFunctionRule {
    use_concat: bool,
}

impl PreferMapFunctionRule {
    pub fn new() -> Self {
        Self { use_concat: false }
    }

    pub fn with_concat(use_concat: bool) -> Self {
        Self { use_concat }
    }

    fn suggest_fix(&self, for_of: &ForOfStmt, context: &RuleContext) -> Option<Fix> {
        let (start, end) = context.byte_range(for_of.span);

        let idiom = match extract(for_of) {
            Ok(idiom) => idiom,
            Err(e) => {
                log::debug!("{}: no fix for loop at byte {}: {}", context.file_path, start, e);
                return None;
            }
        };

        // Preceding statements and the pushed value are printed again
        let kept: Vec<Span> = idiom
            .preceding
            .iter()
            .map(|stmt| stmt.span())
            .chain(std::iter::once(idiom.value.span()))
            .collect();
        let Some(comments) = carried_comments(context.comments, for_of.span, &kept) else {
            log::debug!(
                "{}: no fix for loop at byte {}: a comment in it would be lost",
                context.file_path,
                start
            );
            return None;
        };

        let replacement = build_replacement(&idiom, self.use_concat);
        let text = match render_stmt(context.source_map, Some(&comments), &replacement) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{}: failed to render fix at byte {}: {}", context.file_path, start, e);
                return None;
            }
        };

        let description = if self.use_concat {
            "Concatenate a map over the iterated collection"
        } else {
            "Replace the loop with a map over the iterated collection"
        };

        Some(Fix {
            description: description.to_string(),
            start,
            end,
            replacement: indent_continuation(&text, line_indent(context.source, start)),
        })
    }
}

impl Default for PreferMapFunctionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRule for PreferMapFunctionRule {
    fn rule_id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Recommends a map-function over a standard 'for-of' loop if only another array is populated based on the array of the for-of loop"
    }

    fn has_fix(&self) -> bool {
        true
    }

    fn check(&self, context: &RuleContext) -> Vec<Violation> {
        let mut violations = Vec::new();

        let Stmt::ForOf(for_of) = context.stmt else {
            return violations;
        };
        if !matches(for_of) {
            return violations;
        }

        let (start, _) = context.byte_range(for_of.span);
        let violation = match self.suggest_fix(for_of, context) {
            Some(fix) => Violation::with_fix(
                RULE_ID.to_string(),
                FAILURE_MESSAGE.to_string(),
                start,
                context.file_path.to_string(),
                Severity::Warning,
                fix,
            ),
            None => Violation::new(
                RULE_ID.to_string(),
                FAILURE_MESSAGE.to_string(),
                start,
                context.file_path.to_string(),
                Severity::Warning,
            ),
        };
        violations.push(violation);

        violations
    }
}
