//! Configuration loading for prefer-map-linter
//!
//! Loads configuration from a `prefer-map.toml` file found in the current
//! directory or one of its ancestors.

use crate::rules::get_all_rule_ids;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "prefer-map.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Rules to enable (empty means all rules, or use ["ALL"])
    #[serde(default)]
    pub enable: Vec<String>,

    /// Rules to disable
    #[serde(default)]
    pub disable: Vec<String>,

    /// Paths to exclude from linting
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Rule-specific configuration
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

/// Rule-specific configuration
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct RuleConfig {
    /// PMAP001: suggest `target = target.concat(source.map(...))`
    pub use_concat: Option<bool>,
}

impl Config {
    /// Settings for one rule, if any were given
    pub fn rule(&self, rule_id: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_id)
    }

    /// Settings for one rule, created empty if missing
    pub fn rule_mut(&mut self, rule_id: &str) -> &mut RuleConfig {
        self.rules.entry(rule_id.to_string()).or_default()
    }
}

/// Find `prefer-map.toml` starting from a path and walking up
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        current = current.parent()?;
    }
}

/// Load configuration from `path`, or from the nearest `prefer-map.toml`
/// above the current directory when no path is given
pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            p.to_path_buf()
        } else {
            log::warn!("Config file {} does not exist", p.display());
            return None;
        }
    } else {
        find_config_file(&std::env::current_dir().ok()?)?
    };

    let content = std::fs::read_to_string(&config_path).ok()?;
    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Ignoring invalid config {}: {}", config_path.display(), e);
            None
        }
    }
}

/// Merge command line arguments with config file settings
/// CLI arguments take precedence
pub fn merge_config(
    config: Option<&Config>,
    cli_enable: &[String],
    cli_disable: &[String],
    cli_exclude: &[String],
) -> (Option<Vec<String>>, Vec<String>) {
    let mut enable = None;
    let mut exclude = vec![];

    // Start with config file settings
    if let Some(cfg) = config {
        if cli_enable.is_empty() && cli_disable.is_empty() {
            enable = resolve_enabled(&cfg.enable, &cfg.disable);
        }

        exclude.extend(cfg.exclude.iter().cloned());
    }

    // Apply CLI overrides
    if !cli_enable.is_empty() || !cli_disable.is_empty() {
        enable = resolve_enabled(cli_enable, cli_disable);
    }

    // Add CLI exclude patterns
    exclude.extend(cli_exclude.iter().cloned());

    // Add default excludes
    let defaults = vec![
        "node_modules",
        ".git",
        "dist",
        "build",
        "coverage",
        ".next",
        ".turbo",
        "bower_components",
    ];
    for default in defaults {
        if !exclude.iter().any(|e| e == default) {
            exclude.push(default.to_string());
        }
    }

    (enable, exclude)
}

/// Turn enable/disable lists into the set of enabled rule IDs.
/// `None` means every rule.
fn resolve_enabled(enable: &[String], disable: &[String]) -> Option<Vec<String>> {
    let wants_all = enable.is_empty() || enable.iter().any(|r| r == "ALL");

    if !wants_all {
        return Some(
            enable
                .iter()
                .filter(|r| !disable.contains(r))
                .cloned()
                .collect(),
        );
    }

    if disable.is_empty() {
        if enable.is_empty() {
            None
        } else {
            Some(get_all_rule_ids())
        }
    } else {
        Some(
            get_all_rule_ids()
                .into_iter()
                .filter(|r| !disable.contains(r))
                .collect(),
        )
    }
}
