use std::{fmt::Write as _, path::Path, sync::Arc};

use analysis_pipeline::{logic::Severity, StaticAnalysis};
use anyhow::{Context, Result};
use common::{models::checkpoint::EmbeddingCheckpoint, utils::config::get_config};
use review_pipeline::{review::AiReview, ReviewDispatcher};
use serde::Serialize;
use tracing::info;

use crate::{
    args::{AnalyzeArgs, EmbeddingArgs},
    provider, report,
};

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub generated_at: String,
    pub source: String,
    #[serde(flatten)]
    pub static_analysis: StaticAnalysis,
    pub ai_review: AiReview,
}

/// Runs the full static checks plus one AI review on a single file and
/// writes the per-file report.
pub async fn run(args: &AnalyzeArgs, embedding: &EmbeddingArgs, report_dir: &Path) -> Result<()> {
    let code = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    let config = get_config().context("loading configuration")?;
    let embedding_provider = Arc::new(provider::build_provider(embedding).await?);
    let checkpoint = EmbeddingCheckpoint::load(Path::new(&config.checkpoint_path())).ok();
    let dispatcher = ReviewDispatcher::from_config(&config, embedding_provider, checkpoint);

    let model = args.model.as_deref();
    let static_analysis = analysis_pipeline::analyze(&code, model);
    let ai_review = dispatcher.review(&code, model).await;
    info!(
        source = %args.file.display(),
        syntax_valid = static_analysis.syntax_valid,
        model_used = %ai_review.model_used,
        "File analyzed"
    );

    let analyze_report = AnalyzeReport {
        generated_at: report::format_timestamp(),
        source: args.file.display().to_string(),
        static_analysis,
        ai_review,
    };

    let markdown = render_markdown(&analyze_report)?;
    print!("{markdown}");
    let paths = report::write_reports(report_dir, "analyze", &analyze_report, &markdown)?;
    println!(
        "Reports: {} / {}",
        paths.json.display(),
        paths.markdown.display()
    );
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::Major => "major",
        Severity::Minor => "minor",
    }
}

fn render_markdown(report: &AnalyzeReport) -> Result<String> {
    let analysis = &report.static_analysis;
    let mut out = String::new();
    let _ = writeln!(out, "# Code analysis ({})", report.source);
    let _ = writeln!(out);

    if analysis.syntax_valid {
        let _ = writeln!(out, "Syntax: valid");
    } else {
        let _ = writeln!(
            out,
            "Syntax: invalid ({})",
            analysis.syntax_error.as_deref().unwrap_or("unknown error")
        );
    }
    let _ = writeln!(out, "Lines: {}", analysis.quality_metrics.line_count);
    let _ = writeln!(
        out,
        "Average cyclomatic complexity: {:.2}",
        analysis.quality_metrics.cyclomatic_complexity
    );
    let _ = writeln!(out);

    let logic = &analysis.logic_analysis;
    let _ = writeln!(
        out,
        "## Logic scan ({} issue{})",
        logic.total_issues,
        if logic.total_issues == 1 { "" } else { "s" }
    );
    for issue in &logic.issues {
        let location = issue
            .line
            .map_or_else(String::new, |line| format!("line {line}: "));
        let _ = writeln!(
            out,
            "- [{}] {}{} ({})",
            severity_label(issue.severity),
            location,
            issue.message,
            issue.suggestion
        );
    }
    let _ = writeln!(out);

    let practices = &analysis.best_practices;
    let _ = writeln!(out, "## Best practices");
    let groups = [
        ("Style", &practices.style_violations),
        ("Performance", &practices.performance_issues),
        ("Security", &practices.security_issues),
        ("Maintainability", &practices.maintainability),
    ];
    for (title, findings) in groups {
        if findings.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {title}");
        for finding in findings {
            let location = finding
                .line
                .map_or_else(String::new, |line| format!("line {line}: "));
            let _ = writeln!(out, "- {}{} ({})", location, finding.issue, finding.suggestion);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", practices.model_recommendation);
    let _ = writeln!(out);

    let review = &report.ai_review;
    let _ = writeln!(out, "## AI review ({})", review.model_used);
    let _ = writeln!(out, "{}", review.summary);
    if !review.suggestions.is_empty() {
        let _ = writeln!(out, "### Suggestions");
        for suggestion in &review.suggestions {
            let _ = writeln!(out, "- {suggestion}");
        }
    }
    if !review.issues.is_empty() {
        let _ = writeln!(out, "### Issues");
        for issue in &review.issues {
            let _ = writeln!(out, "- {issue}");
        }
    }
    let _ = writeln!(out, "Quality rating: {}", review.quality_rating);
    let _ = writeln!(out, "{}", review.recommendation);
    let _ = writeln!(out);

    let raw = serde_json::to_string_pretty(report).context("serializing analysis report")?;
    let _ = writeln!(out, "## Raw JSON");
    let _ = writeln!(out, "```json");
    let _ = writeln!(out, "{raw}");
    let _ = writeln!(out, "```");
    Ok(out)
}
