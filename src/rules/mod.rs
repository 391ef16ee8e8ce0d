//! Lint rules for prefer-map-linter

pub mod base;

// Rule implementations
pub mod pmap001_prefer_map_function;

use crate::config::Config;
use base::LintRule;
use std::collections::HashMap;

/// Get all available rules with their default settings
pub fn get_all_rules() -> Vec<Box<dyn LintRule>> {
    get_all_rules_with_config(&Config::default())
}

/// Get all available rules, applying rule-specific settings from `config`
pub fn get_all_rules_with_config(config: &Config) -> Vec<Box<dyn LintRule>> {
    let prefer_map = config.rule(pmap001_prefer_map_function::RULE_ID);

    vec![Box::new(
        pmap001_prefer_map_function::PreferMapFunctionRule::with_concat(
            prefer_map.and_then(|r| r.use_concat).unwrap_or(false),
        ),
    )]
}

/// Get rules by ID for quick lookup
pub fn get_rules_by_id() -> HashMap<String, Box<dyn LintRule>> {
    get_all_rules()
        .into_iter()
        .map(|rule| (rule.rule_id().to_string(), rule))
        .collect()
}

/// Get all available rule IDs
pub fn get_all_rule_ids() -> Vec<String> {
    get_all_rules()
        .iter()
        .map(|rule| rule.rule_id().to_string())
        .collect()
}

/// Get rules filtered by enabled IDs
pub fn get_enabled_rules(enabled_ids: Option<&[String]>, config: &Config) -> Vec<Box<dyn LintRule>> {
    let all_rules = get_all_rules_with_config(config);

    match enabled_ids {
        Some(ids) => all_rules
            .into_iter()
            .filter(|rule| ids.iter().any(|id| id == rule.rule_id()))
            .collect(),
        None => all_rules,
    }
}
