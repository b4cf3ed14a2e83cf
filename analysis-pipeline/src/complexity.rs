use serde::Serialize;
use tracing::debug;
use tree_sitter::Node;

use crate::syntax;

#[derive(Debug, Clone, Serialize)]
pub struct QualityMetrics {
    pub line_count: usize,
    pub cyclomatic_complexity: f64,
}

/// Node kinds that open an extra path through a function body.
const DECISION_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "while_statement",
    "for_statement",
    "except_clause",
    "conditional_expression",
    "boolean_operator",
    "if_clause",
    "assert_statement",
];

/// Line count plus average per-function cyclomatic complexity
/// (1 + decision points). Snippets without any function definition score
/// 0.0, matching the "nothing to measure" case.
pub fn analyze_quality(code: &str) -> QualityMetrics {
    let line_count = code.lines().count();

    let cyclomatic_complexity = match syntax::parse(code) {
        Some(tree) => {
            let mut functions = Vec::new();
            collect_functions(tree.root_node(), &mut functions);

            if functions.is_empty() {
                debug!("No function definitions found for complexity calculation");
                0.0
            } else {
                let total: usize = functions
                    .iter()
                    .map(|function| 1 + count_decisions(*function))
                    .sum();
                let average = total as f64 / functions.len() as f64;
                (average * 100.0).round() / 100.0
            }
        }
        None => 0.0,
    };

    debug!(
        line_count,
        cyclomatic_complexity, "Code quality metrics computed"
    );

    QualityMetrics {
        line_count,
        cyclomatic_complexity,
    }
}

fn collect_functions<'tree>(node: Node<'tree>, out: &mut Vec<Node<'tree>>) {
    if node.kind() == "function_definition" {
        out.push(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.children(&mut cursor).collect();
    for child in children {
        collect_functions(child, out);
    }
}

fn count_decisions(function: Node) -> usize {
    let mut count = 0;
    let mut stack = vec![function];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            // Nested functions are measured on their own
            if child.kind() == "function_definition" {
                continue;
            }
            if DECISION_KINDS.contains(&child.kind()) {
                count += 1;
            }
            stack.push(child);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_function_scores_one() {
        let metrics = analyze_quality("def f():\n    return 1\n");
        assert_eq!(metrics.cyclomatic_complexity, 1.0);
        assert_eq!(metrics.line_count, 2);
    }

    #[test]
    fn branches_raise_complexity() {
        let code = "def f(x):\n    if x > 0:\n        return 1\n    elif x < 0:\n        return -1\n    return 0\n";
        let metrics = analyze_quality(code);
        // 1 + if + elif
        assert_eq!(metrics.cyclomatic_complexity, 3.0);
    }

    #[test]
    fn average_is_taken_over_functions() {
        let code = concat!(
            "def simple():\n    return 1\n\n",
            "def branchy(x):\n    if x:\n        return 1\n    return 0\n",
        );
        let metrics = analyze_quality(code);
        // (1 + 2) / 2
        assert_eq!(metrics.cyclomatic_complexity, 1.5);
    }

    #[test]
    fn no_functions_scores_zero() {
        let metrics = analyze_quality("x = 1\ny = 2\n");
        assert_eq!(metrics.cyclomatic_complexity, 0.0);
        assert_eq!(metrics.line_count, 2);
    }
}
