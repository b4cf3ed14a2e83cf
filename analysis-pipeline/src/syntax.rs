use serde::Serialize;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

#[derive(Debug, Clone, Serialize)]
pub struct SyntaxReport {
    pub valid: bool,
    pub error: Option<String>,
}

/// Parses the snippet with the tree-sitter Python grammar. Returns None
/// only if the grammar cannot be loaded, which is a build problem rather
/// than an input problem.
pub(crate) fn parse(code: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(code, None)
}

/// A snippet is valid iff its tree contains no ERROR or MISSING nodes.
pub fn check_syntax(code: &str) -> SyntaxReport {
    let Some(tree) = parse(code) else {
        return SyntaxReport {
            valid: false,
            error: Some("python grammar unavailable".to_string()),
        };
    };

    let root = tree.root_node();
    if !root.has_error() {
        debug!("Syntax check passed");
        return SyntaxReport {
            valid: true,
            error: None,
        };
    }

    let message = first_error(root).map_or_else(
        || "invalid syntax".to_string(),
        |node| {
            let position = node.start_position();
            if node.is_missing() {
                format!(
                    "missing {} at line {}, column {}",
                    node.kind(),
                    position.row + 1,
                    position.column + 1
                )
            } else {
                format!(
                    "invalid syntax at line {}, column {}",
                    position.row + 1,
                    position.column + 1
                )
            }
        },
    );

    debug!(error = %message, "Syntax check failed");
    SyntaxReport {
        valid: false,
        error: Some(message),
    }
}

fn first_error(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    // has_error is set but no explicit error child surfaced; report the
    // enclosing node.
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_code_passes() {
        let report = check_syntax("def greet(name):\n    return f\"hi {name}\"\n");
        assert!(report.valid);
        assert!(report.error.is_none());
    }

    #[test]
    fn unbalanced_parenthesis_fails_with_location() {
        let report = check_syntax("def broken(:\n    pass\n");
        assert!(!report.valid);
        let message = report.error.expect("error message");
        assert!(message.contains("line"), "got: {message}");
    }

    #[test]
    fn empty_input_is_valid() {
        assert!(check_syntax("").valid);
    }

    #[test]
    fn stray_indent_fails() {
        let report = check_syntax("x = 1\n        y = (\n");
        assert!(!report.valid);
    }
}
