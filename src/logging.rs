//! Run log for prefer-map-linter
//!
//! Appends one JSON object per lint run to a file (JSON Lines), so findings
//! can be tracked over time.

use crate::models::{LintResult, Severity};
use crate::noqa::offset_to_line;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single log entry representing one lint run
#[derive(Debug, Serialize, Deserialize)]
pub struct LintLogEntry {
    /// Unix timestamp of when the lint was run
    pub timestamp: u64,
    /// ISO 8601 formatted date string
    pub datetime: String,
    /// Total number of files scanned
    pub files_scanned: usize,
    /// Total number of violations found
    pub total_violations: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    /// Violations that came with a suggested replacement
    pub fixes_available: usize,
    /// Individual violations
    pub violations: Vec<ViolationLogEntry>,
    /// Run mode (check, fix)
    pub run_mode: String,
    /// Enabled rules for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_rules: Option<Vec<String>>,
}

/// Log entry for a single violation
#[derive(Debug, Serialize, Deserialize)]
pub struct ViolationLogEntry {
    /// Rule ID (e.g., PMAP001)
    pub rule_id: String,
    pub file_path: String,
    pub line: usize,
    pub severity: String,
    pub message: String,
    /// Suggested replacement text, truncated if too long
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl LintLogEntry {
    /// Create a new log entry from lint results
    pub fn from_results(
        results: &[LintResult],
        run_mode: &str,
        enabled_rules: Option<Vec<String>>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut violations = Vec::new();
        let mut error_count = 0;
        let mut warning_count = 0;
        let mut info_count = 0;
        let mut fixes_available = 0;

        for result in results {
            // Offsets are byte positions in the file as it was linted
            let content = std::fs::read_to_string(&result.file_path).unwrap_or_default();

            for v in &result.violations {
                match v.severity {
                    Severity::Error => error_count += 1,
                    Severity::Warning => warning_count += 1,
                    Severity::Info => info_count += 1,
                }
                if v.fix.is_some() {
                    fixes_available += 1;
                }

                violations.push(ViolationLogEntry {
                    rule_id: v.rule_id.clone(),
                    file_path: v.file_path.clone(),
                    line: offset_to_line(&content, v.offset),
                    severity: v.severity.to_string(),
                    message: v.message.clone(),
                    replacement: v
                        .fix
                        .as_ref()
                        .map(|f| truncate(&f.replacement, 200)),
                });
            }
        }

        Self {
            timestamp,
            datetime: format_datetime(timestamp),
            files_scanned: results.len(),
            total_violations: violations.len(),
            error_count,
            warning_count,
            info_count,
            fixes_available,
            violations,
            run_mode: run_mode.to_string(),
            enabled_rules,
        }
    }
}

/// Logger that writes lint results to a file
pub struct LintLogger {
    writer: BufWriter<File>,
    log_path: String,
}

impl LintLogger {
    /// Create a new logger that writes to the specified file
    /// If the file exists, it will be appended to; otherwise created
    pub fn new(log_path: &str) -> std::io::Result<Self> {
        let path = Path::new(log_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            log_path: log_path.to_string(),
        })
    }

    /// Log a lint run to the file
    pub fn log(&mut self, entry: &LintLogEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }

    /// Get the path of the log file
    pub fn log_path(&self) -> &str {
        &self.log_path
    }
}

/// Format a unix timestamp as ISO 8601 datetime string
fn format_datetime(timestamp: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}

/// Truncate text to at most `max_len` bytes, on a char boundary
fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fix, LintResult, Severity, Violation};
    use tempfile::TempDir;

    #[test]
    fn test_lint_log_entry_creation() {
        let fix = Fix {
            description: "Replace the loop".to_string(),
            start: 0,
            end: 10,
            replacement: "out = xs.map((x)=>x);".to_string(),
        };
        let violations = vec![
            Violation::with_fix(
                "PMAP001".to_string(),
                "Test message".to_string(),
                0,
                "missing.js".to_string(),
                Severity::Warning,
                fix,
            ),
            Violation::new(
                "PMAP001".to_string(),
                "Test message".to_string(),
                0,
                "missing.js".to_string(),
                Severity::Warning,
            ),
        ];

        let result = LintResult {
            file_path: "missing.js".to_string(),
            violations,
            error: None,
        };

        let entry = LintLogEntry::from_results(&[result], "check", None);

        assert_eq!(entry.files_scanned, 1);
        assert_eq!(entry.total_violations, 2);
        assert_eq!(entry.warning_count, 2);
        assert_eq!(entry.error_count, 0);
        assert_eq!(entry.fixes_available, 1);
        assert_eq!(entry.violations[0].line, 1);
        assert_eq!(entry.violations[0].replacement.as_deref(), Some("out = xs.map((x)=>x);"));
        assert!(entry.violations[1].replacement.is_none());
        assert_eq!(entry.run_mode, "check");
    }

    #[test]
    fn test_logger_creation_and_write() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("lint.jsonl");
        let log_path_str = log_path.to_string_lossy().to_string();

        let mut logger = LintLogger::new(&log_path_str).unwrap();
        assert_eq!(logger.log_path(), log_path_str);

        let entry = LintLogEntry::from_results(&[], "fix", Some(vec!["PMAP001".to_string()]));
        logger.log(&entry).unwrap();
        logger.log(&entry).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let parsed: LintLogEntry = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.run_mode, "fix");
        assert_eq!(parsed.enabled_rules, Some(vec!["PMAP001".to_string()]));
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_datetime(1733126639), "2024-12-02T08:03:59Z");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 100), "short");

        let long = "a".repeat(250);
        let truncated = truncate(&long, 200);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate("ééé", 3), "é...");
    }
}
