use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicIssue {
    /// 1-based line, None for whole-snippet findings.
    pub line: Option<usize>,
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeverityCount {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicReport {
    pub total_issues: usize,
    pub issues: Vec<LogicIssue>,
    pub severity_count: SeverityCount,
}

static SINGLE_LETTER_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w.])([a-z])\s*=\s*[^=\s]").expect("valid regex"));
static MAGIC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w.])(\d{2,})(?:$|[^\w.])").expect("valid regex"));
static DIV_BY_ZERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:/|//|%)\s*0(?:$|[^\d.\w])").expect("valid regex"));
static BARE_EXCEPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*except\s*:").expect("valid regex"));
static RISKY_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w.])(open|json\.load|requests\.get|int|float)\(").expect("valid regex")
});

/// Numbers common enough to be self-explanatory.
const ALLOWED_NUMBERS: &[&str] = &["24", "60", "100"];

/// Line-oriented pattern scan for logic-level smells. Comment tails are
/// stripped before matching; every finding carries a severity and a
/// concrete suggestion.
pub fn analyze(code: &str) -> LogicReport {
    let mut issues = Vec::new();

    check_variable_naming(code, &mut issues);
    check_magic_numbers(code, &mut issues);
    check_division_by_zero(code, &mut issues);
    check_error_handling(code, &mut issues);
    check_repetition(code, &mut issues);
    check_imports(code, &mut issues);
    check_general_practices(code, &mut issues);

    let severity_count = count_severities(&issues);
    debug!(total = issues.len(), "Logic analysis complete");

    LogicReport {
        total_issues: issues.len(),
        issues,
        severity_count,
    }
}

/// Code part of a line, with any `#` comment tail removed. Naive about
/// hashes inside string literals, as a line scanner has to be.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => line.get(..index).unwrap_or(line),
        None => line,
    }
}

fn scan_lines<'a>(code: &'a str) -> impl Iterator<Item = (usize, &'a str)> {
    code.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, strip_comment(line)))
}

fn check_variable_naming(code: &str, issues: &mut Vec<LogicIssue>) {
    for (line_no, line) in scan_lines(code) {
        if line.contains("for ") {
            continue;
        }
        if SINGLE_LETTER_ASSIGN.is_match(line) {
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "variable_naming",
                severity: Severity::Minor,
                message: format!("Single-letter variable name: {}", line.trim()),
                suggestion: "Use descriptive variable names (e.g. user_count instead of x)"
                    .to_string(),
            });
        }
    }
}

fn check_magic_numbers(code: &str, issues: &mut Vec<LogicIssue>) {
    for (line_no, line) in scan_lines(code) {
        for capture in MAGIC_NUMBER.captures_iter(line) {
            let Some(number) = capture.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if ALLOWED_NUMBERS.contains(&number) {
                continue;
            }
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "magic_number",
                severity: Severity::Minor,
                message: format!("Magic number '{number}' found: {}", line.trim()),
                suggestion: format!("Define it as a named constant, e.g. SOME_LIMIT = {number}"),
            });
        }
    }
}

fn check_division_by_zero(code: &str, issues: &mut Vec<LogicIssue>) {
    for (line_no, line) in scan_lines(code) {
        if DIV_BY_ZERO.is_match(line) {
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "division_by_zero",
                severity: Severity::Critical,
                message: format!("Division by a literal zero: {}", line.trim()),
                suggestion: "This always raises ZeroDivisionError; guard the divisor or remove the expression".to_string(),
            });
        }
    }
}

fn check_error_handling(code: &str, issues: &mut Vec<LogicIssue>) {
    let has_try_except = code.contains("try:") && code.contains("except");
    if has_try_except {
        return;
    }

    for (line_no, line) in scan_lines(code) {
        if let Some(capture) = RISKY_CALL.captures(line) {
            let call = capture.get(1).map_or("call", |m| m.as_str());
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "error_handling",
                severity: Severity::Major,
                message: format!("Missing error handling for '{call}': {}", line.trim()),
                suggestion: "Wrap the call in a try/except block and handle the failure"
                    .to_string(),
            });
        }
    }
}

fn check_repetition(code: &str, issues: &mut Vec<LogicIssue>) {
    let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
    for (line_no, line) in scan_lines(code) {
        let trimmed = line.trim();
        if trimmed.len() > 20 {
            occurrences.entry(trimmed).or_default().push(line_no);
        }
    }

    let mut repeated: Vec<(&str, Vec<usize>)> = occurrences
        .into_iter()
        .filter(|(_, lines)| lines.len() >= 3)
        .collect();
    // HashMap iteration order is arbitrary; report in source order
    repeated.sort_by_key(|(_, lines)| lines.first().copied());

    for (_, lines) in repeated {
        let listing = lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(LogicIssue {
            line: lines.first().copied(),
            category: "repetition",
            severity: Severity::Major,
            message: format!("Identical statement repeated {} times (lines {listing})", lines.len()),
            suggestion: "Extract the repeated code into a function".to_string(),
        });
    }
}

fn check_imports(code: &str, issues: &mut Vec<LogicIssue>) {
    for (line_no, line) in scan_lines(code) {
        if line.contains("import *") {
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "imports",
                severity: Severity::Major,
                message: "Wildcard import (from module import *)".to_string(),
                suggestion: "Import the specific names you use".to_string(),
            });
        }
    }
}

fn check_general_practices(code: &str, issues: &mut Vec<LogicIssue>) {
    if code.contains("print(") && !code.contains("logging") {
        issues.push(LogicIssue {
            line: None,
            category: "logging",
            severity: Severity::Minor,
            message: "print() used without the logging module".to_string(),
            suggestion: "Use the logging module instead of print() for better control".to_string(),
        });
    }

    for (line_no, line) in scan_lines(code) {
        if BARE_EXCEPT.is_match(line) {
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "exception_handling",
                severity: Severity::Major,
                message: "Bare except clause".to_string(),
                suggestion: "Catch a specific exception type instead of a bare except:".to_string(),
            });
        }

        if line.trim_start().starts_with("def ") && (line.contains("=[]") || line.contains("={}"))
        {
            issues.push(LogicIssue {
                line: Some(line_no),
                category: "mutable_defaults",
                severity: Severity::Major,
                message: format!("Mutable default argument: {}", line.trim()),
                suggestion: "Default to None and initialise inside the function".to_string(),
            });
        }
    }
}

fn count_severities(issues: &[LogicIssue]) -> SeverityCount {
    let mut count = SeverityCount::default();
    for issue in issues {
        match issue.severity {
            Severity::Critical => count.critical += 1,
            Severity::Major => count.major += 1,
            Severity::Minor => count.minor += 1,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(report: &LogicReport) -> Vec<&'static str> {
        report.issues.iter().map(|issue| issue.category).collect()
    }

    #[test]
    fn division_by_zero_literal_is_flagged_as_critical() {
        let report = analyze("result = total / 0\n");
        assert!(categories(&report).contains(&"division_by_zero"));
        assert_eq!(report.severity_count.critical, 1);
    }

    #[test]
    fn division_by_variable_is_not_flagged() {
        let report = analyze("result = total / count\nratio = a / 0.5\n");
        assert!(!categories(&report).contains(&"division_by_zero"));
    }

    #[test]
    fn comment_tails_are_ignored() {
        let report = analyze("value = safe()  # dividing by 0 here would be bad\n");
        assert!(!categories(&report).contains(&"division_by_zero"));
    }

    #[test]
    fn risky_calls_without_try_are_major() {
        let report = analyze("data = open('file.txt')\n");
        assert!(categories(&report).contains(&"error_handling"));
        assert!(report.severity_count.major >= 1);
    }

    #[test]
    fn risky_calls_inside_try_are_fine() {
        let code = "try:\n    data = open('file.txt')\nexcept OSError:\n    data = None\n";
        let report = analyze(code);
        assert!(!categories(&report).contains(&"error_handling"));
    }

    #[test]
    fn loop_counters_are_not_naming_issues() {
        let report = analyze("for i in range(3):\n    total = total + i\n");
        assert!(!categories(&report).contains(&"variable_naming"));
    }

    #[test]
    fn single_letter_assignment_is_minor() {
        let report = analyze("x = compute_value()\n");
        assert!(categories(&report).contains(&"variable_naming"));
    }

    #[test]
    fn magic_numbers_respect_allow_list() {
        let report = analyze("timeout = 3600\nhours = 24\n");
        let magic: Vec<_> = report
            .issues
            .iter()
            .filter(|issue| issue.category == "magic_number")
            .collect();
        assert_eq!(magic.len(), 1);
        assert!(magic[0].message.contains("3600"));
    }

    #[test]
    fn repeated_long_lines_are_reported_once() {
        let line = "session.commit_with_retry(transaction)\n";
        let report = analyze(&line.repeat(3));
        let repeats: Vec<_> = report
            .issues
            .iter()
            .filter(|issue| issue.category == "repetition")
            .collect();
        assert_eq!(repeats.len(), 1);
        assert_eq!(repeats[0].line, Some(1));
    }

    #[test]
    fn bare_except_and_wildcard_imports() {
        let code = "from os import *\ntry:\n    pass\nexcept:\n    pass\n";
        let report = analyze(code);
        let found = categories(&report);
        assert!(found.contains(&"imports"));
        assert!(found.contains(&"exception_handling"));
    }

    #[test]
    fn mutable_default_argument() {
        let report = analyze("def process(items=[]):\n    return items\n");
        assert!(categories(&report).contains(&"mutable_defaults"));
    }

    #[test]
    fn severity_counts_add_up() {
        let code = "x = 1 / 0\ndata = open('f')\n";
        let report = analyze(code);
        let total = report.severity_count.critical
            + report.severity_count.major
            + report.severity_count.minor;
        assert_eq!(total, report.total_issues);
    }
}
