//! Threat scanning for free text submitted by the public.
//!
//! Sighting notes are typed by anonymous reporters. They are scanned for:
//! - markup / script injection
//! - SQL injection
//! - shell command injection
//!
//! Detections are logged and counted. The text itself is preserved; callers
//! escape on output.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::logging::structured::LogContext;

lazy_static! {
    static ref MARKUP_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)<script[^>]*>").unwrap(),
        Regex::new(r"(?i)javascript:").unwrap(),
        Regex::new(r"(?i)\bon\w+\s*=").unwrap(),
        Regex::new(r"(?i)<iframe[^>]*>").unwrap(),
        Regex::new(r"(?i)<(object|embed)[^>]*>").unwrap(),
    ];

    static ref SQL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)'\s*(or|and)\s*'?\d").unwrap(),
        Regex::new(r"(?i);\s*(drop|delete|truncate|alter)\s").unwrap(),
        Regex::new(r"(?i)union\s+(all\s+)?select").unwrap(),
    ];

    static ref CMD_PATTERNS: Vec<Regex> = vec![
        Regex::new(r";\s*(rm|cat|wget|curl|chmod)\s").unwrap(),
        Regex::new(r"\|\s*(bash|sh|zsh|cmd)\b").unwrap(),
        Regex::new(r"\$\([^)]+\)").unwrap(),
    ];
}

/// Per-category detection counts for one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub markup: usize,
    pub sql: usize,
    pub cmd: usize,
}

impl ScanReport {
    pub fn total(&self) -> usize {
        self.markup + self.sql + self.cmd
    }

    pub fn has_detections(&self) -> bool {
        self.total() > 0
    }
}

fn count_matches(patterns: &[Regex], text: &str, kind: &str, ctx: &LogContext) -> usize {
    patterns
        .iter()
        .filter(|pattern| {
            let hit = pattern.is_match(text);
            if hit {
                log::debug!(
                    "{} PATTERN_DETECTED type={} pattern={}",
                    ctx,
                    kind,
                    pattern.as_str()
                );
            }
            hit
        })
        .count()
}

/// Scan `text`, logging a warning if anything matched.
pub fn scan_text(text: &str, ctx: &LogContext) -> ScanReport {
    let report = ScanReport {
        markup: count_matches(&MARKUP_PATTERNS, text, "markup", ctx),
        sql: count_matches(&SQL_PATTERNS, text, "sql", ctx),
        cmd: count_matches(&CMD_PATTERNS, text, "cmd", ctx),
    };

    if report.has_detections() {
        log::warn!(
            "{} SECURITY_DETECTIONS markup={} sql={} cmd={} len={}",
            ctx,
            report.markup,
            report.sql,
            report.cmd,
            text.chars().count()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LogContext {
        LogContext::new("test-eval")
    }

    #[test]
    fn test_markup_detection() {
        let report = scan_text("Seen at depot <script>alert('x')</script>", &ctx());
        assert_eq!(report.markup, 1);
        assert!(report.has_detections());
    }

    #[test]
    fn test_sql_injection_detection() {
        let report = scan_text("yard 4'; DROP TABLE machines; --", &ctx());
        assert_eq!(report.sql, 1);
    }

    #[test]
    fn test_command_injection_detection() {
        let report = scan_text("plate $(cat /etc/passwd)", &ctx());
        assert_eq!(report.cmd, 1);
    }

    #[test]
    fn test_clean_note() {
        let report = scan_text(
            "Yellow loader parked behind the warehouse on the A2, plates removed.",
            &ctx(),
        );
        assert_eq!(report, ScanReport::default());
        assert!(!report.has_detections());
    }
}
