//! Base trait for all lint rules

use crate::models::{RuleContext, Violation};

/// Base trait that all lint rules must implement
pub trait LintRule: Send + Sync {
    /// The unique identifier for this rule (e.g., "PMAP001")
    fn rule_id(&self) -> &str;

    /// Human readable rule name (e.g., "prefer-map-function")
    fn name(&self) -> &str;

    /// Short description of what the rule checks
    fn description(&self) -> &str;

    /// Whether violations of this rule carry a suggested replacement
    fn has_fix(&self) -> bool {
        false
    }

    /// Perform the lint check on a statement
    fn check(&self, context: &RuleContext) -> Vec<Violation>;
}
