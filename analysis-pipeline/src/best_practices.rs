use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::logic::Severity;

#[derive(Debug, Clone, Serialize)]
pub struct PracticeFinding {
    pub line: Option<usize>,
    pub issue: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestPracticesReport {
    pub style_violations: Vec<PracticeFinding>,
    pub performance_issues: Vec<PracticeFinding>,
    pub security_issues: Vec<PracticeFinding>,
    pub maintainability: Vec<PracticeFinding>,
    pub selected_model: Option<String>,
    pub model_recommendation: String,
}

const MAX_LINE_LENGTH: usize = 79;
const MAX_FUNCTION_LINES: usize = 50;

static UNEVEN_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w\s{2,}=\s*\w").expect("valid regex"));
static HARDCODED_CREDENTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(password|api_key|secret)\s*=\s*["']"#).expect("valid regex")
});
static MAGIC_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["'][a-zA-Z]{10,}["']"#).expect("valid regex"));

/// Style, performance, security, and maintainability scans, plus a
/// model-aware recommendation for the review backend.
pub fn check(code: &str, model: Option<&str>) -> BestPracticesReport {
    let report = BestPracticesReport {
        style_violations: check_style(code),
        performance_issues: check_performance(code),
        security_issues: check_security(code),
        maintainability: check_maintainability(code),
        selected_model: model.map(ToString::to_string),
        model_recommendation: model_recommendation(model),
    };
    debug!(
        style = report.style_violations.len(),
        security = report.security_issues.len(),
        "Best practices check complete"
    );
    report
}

fn model_recommendation(model: Option<&str>) -> String {
    match model {
        Some(name) => match name.strip_prefix("custom-") {
            Some(custom) => format!("Using provided custom model: {custom}"),
            None => format!("Using selected model: {name}"),
        },
        None => "No model selected. For local, offline review, train the embedding \
                 backend with `evaluations train` and select 'embedding'."
            .to_string(),
    }
}

fn check_style(code: &str) -> Vec<PracticeFinding> {
    let mut findings = Vec::new();

    for (index, line) in code.lines().enumerate() {
        let line_no = index + 1;

        if line.len() > MAX_LINE_LENGTH {
            findings.push(PracticeFinding {
                line: Some(line_no),
                issue: format!("Line too long ({} > {MAX_LINE_LENGTH} characters)", line.len()),
                suggestion: "Break long lines for readability".to_string(),
                severity: None,
            });
        }

        if line != line.trim_end() {
            findings.push(PracticeFinding {
                line: Some(line_no),
                issue: "Trailing whitespace".to_string(),
                suggestion: "Remove trailing whitespace".to_string(),
                severity: None,
            });
        }

        if line.contains(';') && !line.trim_start().starts_with('#') {
            findings.push(PracticeFinding {
                line: Some(line_no),
                issue: "Multiple statements on one line".to_string(),
                suggestion: "Put each statement on its own line".to_string(),
                severity: None,
            });
        }

        if UNEVEN_SPACING.is_match(line) {
            findings.push(PracticeFinding {
                line: Some(line_no),
                issue: "Inconsistent spacing around operators".to_string(),
                suggestion: "Use single spaces around operators".to_string(),
                severity: None,
            });
        }
    }

    findings
}

fn check_performance(code: &str) -> Vec<PracticeFinding> {
    let mut findings = Vec::new();

    if code.contains("for ") && code.contains(".append(") && !code.contains("list(") {
        findings.push(PracticeFinding {
            line: None,
            issue: "Appending inside a loop".to_string(),
            suggestion: "Consider a list comprehension instead of a loop with append"
                .to_string(),
            severity: None,
        });
    }

    for (index, line) in code.lines().enumerate() {
        if line.contains("range(len(") {
            findings.push(PracticeFinding {
                line: Some(index + 1),
                issue: "Inefficient range(len()) iteration".to_string(),
                suggestion: "Use enumerate() or iterate the collection directly".to_string(),
                severity: None,
            });
        }
    }

    if code.contains("for ") && code.contains("if ") {
        findings.push(PracticeFinding {
            line: None,
            issue: "Potential N+1 pattern (branching per loop iteration)".to_string(),
            suggestion: "Consider batching the conditional work outside the loop".to_string(),
            severity: None,
        });
    }

    findings
}

fn check_security(code: &str) -> Vec<PracticeFinding> {
    let mut findings = Vec::new();

    if code.to_lowercase().contains("query") && code.contains('+') {
        findings.push(PracticeFinding {
            line: None,
            issue: "Potential SQL injection risk".to_string(),
            suggestion: "Use parameterized queries instead of string concatenation".to_string(),
            severity: Some(Severity::Major),
        });
    }

    if HARDCODED_CREDENTIAL.is_match(code) {
        findings.push(PracticeFinding {
            line: None,
            issue: "Hardcoded credentials found".to_string(),
            suggestion: "Load sensitive values from environment variables".to_string(),
            severity: Some(Severity::Critical),
        });
    }

    if code.contains("eval(") || code.contains("exec(") {
        findings.push(PracticeFinding {
            line: None,
            issue: "Dangerous eval() or exec() usage".to_string(),
            suggestion: "Avoid eval/exec; use ast.literal_eval or explicit dispatch".to_string(),
            severity: Some(Severity::Critical),
        });
    }

    if code.contains("chmod") && code.contains("0777") {
        findings.push(PracticeFinding {
            line: None,
            issue: "Insecure file permissions".to_string(),
            suggestion: "Use restrictive permissions such as 0755 or 0644".to_string(),
            severity: Some(Severity::Major),
        });
    }

    findings
}

fn check_maintainability(code: &str) -> Vec<PracticeFinding> {
    let mut findings = Vec::new();

    let has_complex_condition = code.lines().any(|line| {
        line.matches(" and ").count() > 3 || line.matches(" or ").count() > 3
    });
    if has_complex_condition {
        findings.push(PracticeFinding {
            line: None,
            issue: "Complex conditional expressions".to_string(),
            suggestion: "Break complex conditions into named variables or helper functions"
                .to_string(),
            severity: None,
        });
    }

    for (line_no, length) in function_lengths(code) {
        if length > MAX_FUNCTION_LINES {
            findings.push(PracticeFinding {
                line: Some(line_no),
                issue: format!("Large function detected ({length} lines)"),
                suggestion: "Break large functions into smaller, focused functions".to_string(),
                severity: None,
            });
        }
    }

    if MAGIC_STRING.is_match(code) {
        findings.push(PracticeFinding {
            line: None,
            issue: "Magic strings found".to_string(),
            suggestion: "Define string constants at module level".to_string(),
            severity: None,
        });
    }

    findings
}

/// (definition line, body length) for each top-level function, measured by
/// indentation. Nested defs are attributed to their enclosing function.
fn function_lengths(code: &str) -> Vec<(usize, usize)> {
    let mut lengths = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (index, line) in code.lines().enumerate() {
        let trimmed = line.trim_start();
        let is_top_level = !line.starts_with(char::is_whitespace);

        if trimmed.starts_with("def ") && is_top_level {
            if let Some(open) = current.take() {
                lengths.push(open);
            }
            current = Some((index + 1, 0));
        } else if is_top_level && !trimmed.is_empty() {
            if let Some(open) = current.take() {
                lengths.push(open);
            }
        } else if let Some(open) = current.as_mut() {
            if !trimmed.is_empty() {
                open.1 += 1;
            }
        }
    }

    if let Some(open) = current.take() {
        lengths.push(open);
    }

    lengths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lines_and_trailing_whitespace() {
        let long_line = format!("x = \"{}\"\n", "a".repeat(90));
        let code = format!("{long_line}y = 1 \n");
        let report = check(&code, None);
        let issues: Vec<&str> = report
            .style_violations
            .iter()
            .map(|f| f.issue.as_str())
            .collect();
        assert!(issues.iter().any(|issue| issue.contains("Line too long")));
        assert!(issues.contains(&"Trailing whitespace"));
    }

    #[test]
    fn hardcoded_credentials_are_critical() {
        let report = check("password = \"hunter2\"\n", None);
        assert_eq!(report.security_issues.len(), 1);
        assert_eq!(report.security_issues[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn eval_usage_is_flagged() {
        let report = check("result = eval(user_input)\n", None);
        assert!(report
            .security_issues
            .iter()
            .any(|f| f.issue.contains("eval")));
    }

    #[test]
    fn range_len_is_a_performance_issue() {
        let report = check("for i in range(len(items)):\n    print(items[i])\n", None);
        assert!(report
            .performance_issues
            .iter()
            .any(|f| f.issue.contains("range(len())")));
    }

    #[test]
    fn long_functions_are_reported() {
        let mut code = String::from("def big():\n");
        for i in 0..60 {
            code.push_str(&format!("    step_{i} = {i}\n"));
        }
        let report = check(&code, None);
        assert!(report
            .maintainability
            .iter()
            .any(|f| f.issue.contains("Large function")));
    }

    #[test]
    fn recommendation_reflects_selected_model() {
        let selected = check("pass\n", Some("claude"));
        assert_eq!(selected.model_recommendation, "Using selected model: claude");
        assert_eq!(selected.selected_model.as_deref(), Some("claude"));

        let custom = check("pass\n", Some("custom-codebert"));
        assert!(custom.model_recommendation.contains("custom model: codebert"));

        let none = check("pass\n", None);
        assert!(none.model_recommendation.contains("No model selected"));
        assert!(none.selected_model.is_none());
    }

    #[test]
    fn clean_snippet_has_no_security_findings() {
        let report = check("def add(a, b):\n    return a + b\n", None);
        assert!(report.security_issues.is_empty());
    }
}
