use std::{fmt::Write as _, path::Path, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use common::{models::checkpoint::EmbeddingCheckpoint, utils::config::get_config};
use review_pipeline::ReviewDispatcher;
use serde::Serialize;
use tracing::info;

use crate::{
    args::{CompareArgs, EmbeddingArgs},
    corpus, provider, report,
};

#[derive(Debug, Serialize)]
pub struct CompareEntry {
    pub id: String,
    pub name: String,
    pub available: bool,
    pub model_used: String,
    pub quality_rating: String,
    pub summary: String,
    pub duration_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct CompareReport {
    pub generated_at: String,
    pub code_bytes: usize,
    pub source: String,
    pub entries: Vec<CompareEntry>,
}

pub async fn run(args: &CompareArgs, embedding: &EmbeddingArgs, report_dir: &Path) -> Result<()> {
    let (code, source) = match &args.file {
        Some(path) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (corpus::DEFAULT_SNIPPET.to_string(), "built-in".to_string()),
    };

    let config = get_config().context("loading configuration")?;
    let embedding_provider = Arc::new(provider::build_provider(embedding).await?);
    let checkpoint = EmbeddingCheckpoint::load(Path::new(&config.checkpoint_path())).ok();
    let dispatcher = ReviewDispatcher::from_config(&config, embedding_provider, checkpoint);

    let mut entries = Vec::new();
    for model in dispatcher.list_models().await {
        if !model.available && !args.include_unavailable {
            info!(model = %model.id, "Skipping unavailable backend");
            continue;
        }

        let start = Instant::now();
        let review = dispatcher.review(&code, Some(&model.id)).await;
        let duration_ms = start.elapsed().as_millis();
        info!(model = %model.id, duration_ms, "Backend compared");

        entries.push(CompareEntry {
            id: model.id,
            name: model.name,
            available: model.available,
            model_used: review.model_used,
            quality_rating: review.quality_rating,
            summary: review.summary,
            duration_ms,
        });
    }

    let compare_report = CompareReport {
        generated_at: report::format_timestamp(),
        code_bytes: code.len(),
        source,
        entries,
    };

    let markdown = render_markdown(&compare_report);
    print!("{markdown}");
    let paths = report::write_reports(report_dir, "compare", &compare_report, &markdown)?;
    println!(
        "Reports: {} / {}",
        paths.json.display(),
        paths.markdown.display()
    );
    Ok(())
}

fn render_markdown(report: &CompareReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Backend comparison ({})", report.source);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Backend | Rating | Time (ms) | Summary |");
    let _ = writeln!(out, "| --- | --- | --- | --- |");
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "| {} ({}) | {} | {} | {} |",
            entry.name,
            entry.model_used,
            entry.quality_rating,
            entry.duration_ms,
            entry.summary.replace('|', "\\|")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_table_lists_each_entry() {
        let report = CompareReport {
            generated_at: "20250101_000000".to_string(),
            code_bytes: 10,
            source: "built-in".to_string(),
            entries: vec![CompareEntry {
                id: "embedding".to_string(),
                name: "Embedding classifier (hashed)".to_string(),
                available: true,
                model_used: "embedding (hashed)".to_string(),
                quality_rating: "8.0/10 (structural)".to_string(),
                summary: "Simple | regular code.".to_string(),
                duration_ms: 3,
            }],
        };
        let markdown = render_markdown(&report);
        assert!(markdown.contains("| Backend |"));
        assert!(markdown.contains("Embedding classifier"));
        assert!(markdown.contains("Simple \\| regular code."));
    }
}
