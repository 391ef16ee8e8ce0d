//! noqa comment parsing and handling
//!
//! Supports inline comments to suppress lint rules:
//! - `// noqa` - suppress all rules on this line
//! - `// noqa: PMAP001` - suppress specific rule
//! - `/* noqa: PMAP001, PMAP002 */` - suppress multiple rules
//!
//! Directives are read from the comments the parser collected, so `noqa`
//! inside a string or template literal is not a directive. Anything after the
//! rule list is free text: `// noqa: PMAP001 order matters here`.

use crate::ParsedModule;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use swc_core::common::comments::{Comment, SingleThreadedComments};
use swc_core::common::SourceFile;

static NOQA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*noqa\b(?:\s*:\s*([A-Za-z]+[0-9]+(?:\s*,\s*[A-Za-z]+[0-9]+)*))?").unwrap()
});

/// Parsed noqa directives for a file
#[derive(Debug, Default)]
pub struct NoqaDirectives {
    /// Lines where all rules are suppressed
    pub suppress_all: HashSet<usize>,
    /// Lines where specific rules are suppressed: line -> set of rule IDs
    pub suppress_rules: HashMap<usize, HashSet<String>>,
}

impl NoqaDirectives {
    /// Collect directives from the comments of a parsed file
    pub fn from_comments(
        comments: &SingleThreadedComments,
        source_file: &SourceFile,
        source: &str,
    ) -> Self {
        let mut directives = NoqaDirectives::default();
        let (leading, trailing) = comments.borrow_all();

        for comment in leading.values().chain(trailing.values()).flatten() {
            let offset = comment.span.lo.0.saturating_sub(source_file.start_pos.0) as usize;
            directives.add(offset_to_line(source, offset), comment);
        }

        directives
    }

    /// Collect directives from an already parsed module
    pub fn for_module(parsed: &ParsedModule, source: &str) -> Self {
        Self::from_comments(&parsed.comments, &parsed.source_file, source)
    }

    fn add(&mut self, line: usize, comment: &Comment) {
        let Some(caps) = NOQA_REGEX.captures(&comment.text) else {
            return;
        };

        match caps.get(1) {
            // Specific rules: // noqa: PMAP001, PMAP002
            Some(rules) => self.suppress_rules.entry(line).or_default().extend(
                rules
                    .as_str()
                    .split(',')
                    .map(|s| s.trim().to_uppercase()),
            ),
            // Suppress all: // noqa
            None => {
                self.suppress_all.insert(line);
            }
        }
    }

    /// Check if a rule is suppressed at a given line
    pub fn is_suppressed(&self, line: usize, rule_id: &str) -> bool {
        self.suppress_all.contains(&line)
            || self
                .suppress_rules
                .get(&line)
                .is_some_and(|rules| rules.contains(rule_id))
    }
}

/// Convert byte offset to line number (1-indexed)
pub fn offset_to_line(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
