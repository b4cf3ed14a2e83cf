pub mod best_practices;
pub mod complexity;
pub mod logic;
pub mod syntax;

use serde::Serialize;
use tracing::info;

pub use best_practices::BestPracticesReport;
pub use complexity::QualityMetrics;
pub use logic::{LogicReport, Severity};
pub use syntax::SyntaxReport;

/// Aggregate result of all static checks for one snippet. Everything in
/// here is deterministic for a fixed input.
#[derive(Debug, Clone, Serialize)]
pub struct StaticAnalysis {
    pub syntax_valid: bool,
    pub syntax_error: Option<String>,
    pub quality_metrics: QualityMetrics,
    pub logic_analysis: LogicReport,
    pub best_practices: BestPracticesReport,
}

/// Runs the full static pipeline. Invalid syntax is reported in the result
/// rather than aborting: the scanners are line-oriented and still produce
/// useful findings on partially parseable input.
pub fn analyze(code: &str, model: Option<&str>) -> StaticAnalysis {
    let syntax = syntax::check_syntax(code);
    let quality_metrics = complexity::analyze_quality(code);
    let logic_analysis = logic::analyze(code);
    let best_practices = best_practices::check(code, model);

    info!(
        syntax_valid = syntax.valid,
        line_count = quality_metrics.line_count,
        logic_issues = logic_analysis.total_issues,
        "Static analysis complete"
    );

    StaticAnalysis {
        syntax_valid: syntax.valid,
        syntax_error: syntax.error,
        quality_metrics,
        logic_analysis,
        best_practices,
    }
}
