//! prefer-map-linter: flags `for ... of` loops that only fill another array
//!
//! A loop such as
//!
//! ```js
//! for (const el of input) {
//!     output.push(el * 2);
//! }
//! ```
//!
//! is reported with a suggested replacement `output = input.map((el)=>el * 2);`.
//! The crate provides:
//! - The idiom matcher and rewriter ([`idiom`])
//! - A rule registry in the style of a general purpose linter ([`rules`])
//! - File discovery, parallel linting, suppression comments and fix application

pub mod config;
pub mod error;
pub mod fix;
pub mod idiom;
pub mod logging;
pub mod models;
pub mod noqa;
pub mod rules;

use error::ParseError;
use models::{LintResult, RuleContext, Violation};
use noqa::{offset_to_line, NoqaDirectives};
use rayon::prelude::*;
use rules::base::LintRule;
use std::path::Path;
use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::{sync::Lrc, FileName, SourceFile, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Module, Stmt};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use swc_core::ecma::visit::{Visit, VisitWith};
use walkdir::WalkDir;

/// File extensions that are linted
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// A parsed module together with the source map its spans point into
pub struct ParsedModule {
    pub source_map: Lrc<SourceMap>,
    pub source_file: Lrc<SourceFile>,
    pub comments: SingleThreadedComments,
    pub module: Module,
}

/// Pick the parser syntax from the file extension
pub fn syntax_for_path(file_path: &str) -> Syntax {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax::default()),
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

/// Parse source code into a module
pub fn parse_module(file_path: &str, source: &str) -> Result<ParsedModule, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        FileName::Custom(file_path.to_string()).into(),
        source.to_string(),
    );

    let to_parse_error = |e: &swc_core::ecma::parser::error::Error| {
        let offset = e.span().lo.0.saturating_sub(source_file.start_pos.0) as usize;
        ParseError {
            message: e.kind().msg().to_string(),
            line: offset_to_line(source, offset),
        }
    };

    let comments = SingleThreadedComments::default();
    let mut recovered = Vec::new();
    let module = parse_file_as_module(
        &source_file,
        syntax_for_path(file_path),
        EsVersion::EsNext,
        Some(&comments),
        &mut recovered,
    )
    .map_err(|e| to_parse_error(&e))?;

    // Recovered errors are still syntax errors; fixes on such code are unsafe
    if let Some(e) = recovered.first() {
        return Err(to_parse_error(e));
    }

    Ok(ParsedModule {
        source_map,
        source_file,
        comments,
        module,
    })
}

/// Lint a single file and return the results
pub fn lint_file(
    file_path: &Path,
    rules: &[Box<dyn LintRule>],
) -> LintResult {
    let path_str = file_path.to_string_lossy().to_string();

    let source = match std::fs::read_to_string(file_path) {
        Ok(s) => s,
        Err(e) => return LintResult::with_error(path_str, format!("Failed to read file: {}", e)),
    };

    lint_source(&path_str, &source, rules)
}

/// Lint source code and return the results
pub fn lint_source(
    file_path: &str,
    source: &str,
    rules: &[Box<dyn LintRule>],
) -> LintResult {
    let parsed = match parse_module(file_path, source) {
        Ok(parsed) => parsed,
        Err(e) => return LintResult::with_error(file_path.to_string(), format!("Parse error: {}", e)),
    };

    let noqa = NoqaDirectives::for_module(&parsed, source);
    let mut walker = StmtWalker {
        file_path,
        source,
        parsed: &parsed,
        rules,
        noqa: &noqa,
        violations: Vec::new(),
    };
    parsed.module.visit_with(&mut walker);

    log::debug!(
        "{}: {} violation(s) from {} rule(s)",
        file_path,
        walker.violations.len(),
        rules.len()
    );

    let mut result = LintResult::new(file_path.to_string());
    result.violations = walker.violations;
    result
}

/// Runs every rule on every statement of a module, nested ones included
struct StmtWalker<'a> {
    file_path: &'a str,
    source: &'a str,
    parsed: &'a ParsedModule,
    rules: &'a [Box<dyn LintRule>],
    noqa: &'a NoqaDirectives,
    violations: Vec<Violation>,
}

impl Visit for StmtWalker<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        let context = RuleContext {
            stmt,
            file_path: self.file_path,
            source: self.source,
            comments: &self.parsed.comments,
            source_map: &self.parsed.source_map,
            source_file: &self.parsed.source_file,
        };

        for rule in self.rules {
            for v in rule.check(&context) {
                let line = offset_to_line(self.source, v.offset);
                if !self.noqa.is_suppressed(line, &v.rule_id) {
                    self.violations.push(v);
                }
            }
        }

        stmt.visit_children_with(self);
    }
}

/// Collect JavaScript and TypeScript files from paths
pub fn collect_source_files(paths: &[String], exclude_patterns: &[String]) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let p = Path::new(path);
        if p.is_file() {
            if is_source_file(p) {
                files.push(p.to_path_buf());
            }
        } else if p.is_dir() {
            for entry in WalkDir::new(p)
                .into_iter()
                // The root itself was asked for explicitly
                .filter_entry(|e| e.depth() == 0 || !should_exclude(e.path(), exclude_patterns))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_source_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            log::warn!("Skipping {}: no such file or directory", path);
        }
    }

    files
}

fn is_source_file(path: &Path) -> bool {
    let has_source_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| SOURCE_EXTENSIONS.contains(&e));
    // Declaration files have no statements to rewrite
    let is_declaration = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.ends_with(".d.ts") || n.ends_with(".d.mts") || n.ends_with(".d.cts"));
    has_source_extension && !is_declaration
}

fn should_exclude(path: &Path, patterns: &[String]) -> bool {
    // Whole components only: `dist` excludes `dist/` but not `distance.ts`,
    // `src/generated` excludes that directory wherever it sits
    patterns.iter().any(|pattern| path.ends_with(pattern))
}

/// Lint multiple files in parallel
pub fn lint_files_parallel(
    files: &[std::path::PathBuf],
    rules: &[Box<dyn LintRule>],
) -> Vec<LintResult> {
    files
        .par_iter()
        .map(|file| lint_file(file, rules))
        .collect()
}
