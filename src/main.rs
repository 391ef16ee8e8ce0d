//! prefer-map-linter CLI

use anyhow::Context;
use clap::Parser;
use colored::*;
use prefer_map_linter::{
    collect_source_files, config, fix::apply_fixes, lint_files_parallel,
    logging::{LintLogEntry, LintLogger},
    models::{LintResult, Severity},
    rules::{self, pmap001_prefer_map_function as pmap001},
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "prefer-map-linter")]
#[command(version, about = "Finds for-of loops that only fill another array and suggests a map call")]
struct Args {
    /// Files or directories to lint
    #[arg(default_value = ".")]
    paths: Vec<String>,

    /// Enable specific rules (comma-separated, or "ALL")
    #[arg(long, value_delimiter = ',')]
    enable: Vec<String>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Vec<String>,

    /// Exclude paths matching patterns
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    output_format: String,

    /// Ignore prefer-map.toml configuration
    #[arg(long)]
    no_config: bool,

    /// Use this configuration file instead of searching for prefer-map.toml
    #[arg(long, conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Rewrite matching loops in place
    #[arg(long)]
    fix: bool,

    /// Suggest `target = target.concat(src.map(...))` instead of an assignment
    #[arg(long)]
    concat: bool,

    /// Append a JSON record of this run to the given file
    #[arg(long)]
    log_file: Option<String>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init()
        .ok();

    // Load config
    let mut config = if args.no_config {
        None
    } else {
        config::load_config(args.config.as_deref())
    };

    // Merge CLI args with config
    let (enabled_rules, exclude_patterns) = config::merge_config(
        config.as_ref(),
        &args.enable,
        &args.disable,
        &args.exclude,
    );

    if args.concat {
        config
            .get_or_insert_with(config::Config::default)
            .rule_mut(pmap001::RULE_ID)
            .use_concat = Some(true);
    }

    log::debug!("Enabled rules: {:?}", enabled_rules);
    log::debug!("Exclude patterns: {:?}", exclude_patterns);

    // Get rules
    let config = config.unwrap_or_default();
    let all_rules = rules::get_enabled_rules(enabled_rules.as_deref(), &config);

    log::debug!(
        "Active rules: {}",
        all_rules
            .iter()
            .map(|r| r.rule_id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Collect files
    let files = collect_source_files(&args.paths, &exclude_patterns);
    log::debug!("Found {} source files", files.len());

    if files.is_empty() {
        eprintln!("No JavaScript or TypeScript files found");
        return Ok(ExitCode::SUCCESS);
    }

    // Lint files
    let mut results = lint_files_parallel(&files, &all_rules);

    if args.fix {
        let applied = fix_files(&results)?;
        eprintln!("Applied {} fix(es)", applied);
        // Report what is left after rewriting
        results = lint_files_parallel(&files, &all_rules);
    }

    if let Some(log_path) = &args.log_file {
        let mut logger = LintLogger::new(log_path)
            .with_context(|| format!("failed to open log file {}", log_path))?;
        let run_mode = if args.fix { "fix" } else { "check" };
        let entry = LintLogEntry::from_results(&results, run_mode, enabled_rules.clone());
        logger
            .log(&entry)
            .with_context(|| format!("failed to write log file {}", logger.log_path()))?;
    }

    // Count violations
    let mut error_count = 0;
    let mut warning_count = 0;
    let mut info_count = 0;

    for result in &results {
        for v in &result.violations {
            match v.severity {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Info => info_count += 1,
            }
        }
    }

    // Output results
    match args.output_format.as_str() {
        "json" => {
            print_json(&results)?;
        }
        _ => {
            print_text_grouped(&results);
        }
    }

    // Print summary
    let total = error_count + warning_count + info_count;
    if total > 0 {
        eprintln!(
            "\nFound {} issue(s): {} error(s), {} warning(s), {} info",
            total, error_count, warning_count, info_count
        );
    } else if args.verbose {
        eprintln!("\nNo issues found.");
    }

    // Return exit code
    if error_count > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Apply every available fix and write the files back
fn fix_files(results: &[LintResult]) -> anyhow::Result<usize> {
    let mut total = 0;

    for result in results {
        let fixes = result.fixes();
        if fixes.is_empty() {
            continue;
        }

        let source = std::fs::read_to_string(&result.file_path)
            .with_context(|| format!("failed to read {}", result.file_path))?;
        let (fixed, applied) = apply_fixes(&source, &fixes);
        if applied == 0 {
            continue;
        }

        std::fs::write(&result.file_path, fixed)
            .with_context(|| format!("failed to write {}", result.file_path))?;
        log::info!("{}: applied {} fix(es)", result.file_path, applied);
        total += applied;
    }

    Ok(total)
}

/// Rule info with description and fix suggestion
struct RuleInfo {
    name: &'static str,
    description: &'static str,
    fix: &'static str,
}

fn get_rule_info(rule_id: &str) -> RuleInfo {
    match rule_id {
        pmap001::RULE_ID => RuleInfo {
            name: pmap001::RULE_NAME,
            description: "A for-of loop only pushes one value per element onto another array. A map function reduces the complexity of code.",
            fix: "Assign the mapped collection instead: `output = input.map(el => ...)`, or `output = output.concat(input.map(el => ...))` to keep existing items.",
        },
        _ => RuleInfo {
            name: "Unknown Rule",
            description: "Unknown rule violation.",
            fix: "Check the documentation for more information.",
        },
    }
}

/// Violation info for grouping
struct ViolationInfo {
    file_path: String,
    line: usize,
    severity: Severity,
    source_line: String,
    replacement: Option<String>,
}

/// Read a specific line from a file
fn read_source_line(file_path: &str, line_num: usize) -> String {
    if let Ok(content) = std::fs::read_to_string(file_path) {
        content
            .lines()
            .nth(line_num.saturating_sub(1))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    } else {
        String::new()
    }
}

fn print_text_grouped(results: &[LintResult]) {
    // Group violations by rule ID
    let mut grouped: BTreeMap<String, Vec<ViolationInfo>> = BTreeMap::new();

    for result in results {
        if let Some(error) = &result.error {
            eprintln!("{}: {}", result.file_path.red(), error);
            continue;
        }

        for v in &result.violations {
            let line = get_line_from_offset(&result.file_path, v.offset);
            let source_line = read_source_line(&v.file_path, line);
            grouped
                .entry(v.rule_id.clone())
                .or_default()
                .push(ViolationInfo {
                    file_path: v.file_path.clone(),
                    line,
                    severity: v.severity,
                    source_line,
                    replacement: v.fix.as_ref().map(|f| f.replacement.clone()),
                });
        }
    }

    // Print grouped output
    for (rule_id, violations) in &grouped {
        let rule_info = get_rule_info(rule_id);
        let count = violations.len();

        // Determine severity color for header
        let severity = violations.first().map(|v| v.severity).unwrap_or(Severity::Warning);
        let header_color = match severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };

        println!(
            "\n{} {} - {} ({} occurrence{})",
            header_color,
            rule_id.cyan().bold(),
            rule_info.name.white().bold(),
            count,
            if count == 1 { "" } else { "s" }
        );
        println!("{}", "─".repeat(80).dimmed());
        println!("  {} {}", "What:".bright_white(), rule_info.description);
        println!("  {}  {}", "Fix:".bright_green(), rule_info.fix);
        println!();

        for v in violations {
            println!(
                "    {}:{}",
                v.file_path.dimmed(),
                v.line.to_string().yellow()
            );
            if !v.source_line.is_empty() {
                println!("      {}", v.source_line.bright_white());
            }
            if let Some(replacement) = &v.replacement {
                for (i, line) in replacement.lines().enumerate() {
                    let marker = if i == 0 { "=>" } else { "  " };
                    println!("      {} {}", marker.green(), line.trim_end().green());
                }
            }
        }
    }
}

fn print_json(results: &[LintResult]) -> anyhow::Result<()> {
    // Group by rule for JSON output too
    let mut grouped: BTreeMap<String, Vec<serde_json::Value>> = BTreeMap::new();
    let mut errors = Vec::new();

    for result in results {
        if let Some(error) = &result.error {
            errors.push(serde_json::json!({
                "file": result.file_path,
                "error": error,
            }));
        }

        for v in &result.violations {
            let line = get_line_from_offset(&result.file_path, v.offset);
            let source_line = read_source_line(&v.file_path, line);
            grouped
                .entry(v.rule_id.clone())
                .or_default()
                .push(serde_json::json!({
                    "file": v.file_path,
                    "line": line,
                    "severity": format!("{}", v.severity),
                    "message": v.message,
                    "source": source_line,
                    "replacement": v.fix.as_ref().map(|f| f.replacement.as_str()),
                }));
        }
    }

    let rules: Vec<serde_json::Value> = grouped
        .into_iter()
        .map(|(rule_id, violations)| {
            let rule_info = get_rule_info(&rule_id);
            serde_json::json!({
                "rule": rule_id,
                "name": rule_info.name,
                "description": rule_info.description,
                "fix": rule_info.fix,
                "count": violations.len(),
                "violations": violations,
            })
        })
        .collect();

    let output = serde_json::json!({
        "rules": rules,
        "errors": errors,
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialize report")?
    );
    Ok(())
}

fn get_line_from_offset(file_path: &str, offset: usize) -> usize {
    if let Ok(content) = std::fs::read_to_string(file_path) {
        prefer_map_linter::noqa::offset_to_line(&content, offset)
    } else {
        1
    }
}
