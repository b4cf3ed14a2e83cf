use std::{fmt::Write as _, path::Path, sync::Arc, time::Instant};

use anyhow::{bail, Context, Result};
use common::{models::checkpoint::EmbeddingCheckpoint, utils::config::get_config};
use review_pipeline::ReviewDispatcher;
use serde::Serialize;
use tracing::info;

use crate::{
    args::{BenchArgs, EmbeddingArgs},
    corpus, provider, report,
};

#[derive(Debug, Serialize)]
pub struct StaticBenchRow {
    pub snippet: String,
    pub iterations: usize,
    pub total_ms: u128,
    pub mean_us: u128,
    pub deterministic: bool,
}

#[derive(Debug, Serialize)]
pub struct BackendBenchRow {
    pub id: String,
    pub name: String,
    pub model_used: String,
    pub duration_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub generated_at: String,
    pub iterations: usize,
    pub static_checks: Vec<StaticBenchRow>,
    pub backends: Vec<BackendBenchRow>,
}

pub async fn run(args: &BenchArgs, embedding: &EmbeddingArgs, report_dir: &Path) -> Result<()> {
    let static_checks = bench_static_checks(args.iterations)?;

    let backends = if args.static_only {
        Vec::new()
    } else {
        bench_backends(embedding).await?
    };

    let bench_report = BenchReport {
        generated_at: report::format_timestamp(),
        iterations: args.iterations,
        static_checks,
        backends,
    };

    let markdown = render_markdown(&bench_report);
    print!("{markdown}");
    let paths = report::write_reports(report_dir, "bench", &bench_report, &markdown)?;
    println!(
        "Reports: {} / {}",
        paths.json.display(),
        paths.markdown.display()
    );
    Ok(())
}

/// Times the static pipeline per snippet and verifies that repeated runs
/// serialize identically.
fn bench_static_checks(iterations: usize) -> Result<Vec<StaticBenchRow>> {
    let mut rows = Vec::new();
    for (name, code) in corpus::SNIPPETS {
        let baseline = serde_json::to_string(&analysis_pipeline::analyze(code, None))
            .context("serializing baseline analysis")?;

        let mut deterministic = true;
        let start = Instant::now();
        for _ in 0..iterations {
            let rerun = serde_json::to_string(&analysis_pipeline::analyze(code, None))
                .context("serializing analysis rerun")?;
            if rerun != baseline {
                deterministic = false;
            }
        }
        let total = start.elapsed();

        if !deterministic {
            bail!("static checks produced unstable output for snippet '{name}'");
        }

        info!(
            snippet = name,
            iterations,
            total_ms = total.as_millis(),
            "Static checks benchmarked"
        );
        rows.push(StaticBenchRow {
            snippet: (*name).to_string(),
            iterations,
            total_ms: total.as_millis(),
            mean_us: total.as_micros().checked_div(iterations as u128).unwrap_or(0),
            deterministic,
        });
    }
    Ok(rows)
}

/// Times one review per available backend over the default snippet.
async fn bench_backends(embedding: &EmbeddingArgs) -> Result<Vec<BackendBenchRow>> {
    let config = get_config().context("loading configuration")?;
    let embedding_provider = Arc::new(provider::build_provider(embedding).await?);
    let checkpoint = EmbeddingCheckpoint::load(Path::new(&config.checkpoint_path())).ok();
    let dispatcher = ReviewDispatcher::from_config(&config, embedding_provider, checkpoint);

    let mut rows = Vec::new();
    for model in dispatcher.list_models().await {
        if !model.available {
            continue;
        }
        let start = Instant::now();
        let review = dispatcher
            .review(corpus::DEFAULT_SNIPPET, Some(&model.id))
            .await;
        let duration_ms = start.elapsed().as_millis();
        info!(model = %model.id, duration_ms, "Backend benchmarked");
        rows.push(BackendBenchRow {
            id: model.id,
            name: model.name,
            model_used: review.model_used,
            duration_ms,
        });
    }
    Ok(rows)
}

fn render_markdown(report: &BenchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Benchmark ({} iterations)", report.iterations);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Static checks");
    let _ = writeln!(out, "| Snippet | Total (ms) | Mean (us) | Stable |");
    let _ = writeln!(out, "| --- | --- | --- | --- |");
    for row in &report.static_checks {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            row.snippet, row.total_ms, row.mean_us, row.deterministic
        );
    }
    if !report.backends.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Review backends");
        let _ = writeln!(out, "| Backend | Model used | Time (ms) |");
        let _ = writeln!(out, "| --- | --- | --- |");
        for row in &report.backends {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                row.name, row.model_used, row.duration_ms
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_checks_are_stable_over_repeated_runs() {
        let rows = bench_static_checks(3).expect("bench static checks");
        assert_eq!(rows.len(), corpus::SNIPPETS.len());
        assert!(rows.iter().all(|row| row.deterministic));
    }

    #[test]
    fn markdown_includes_backend_section_only_when_present() {
        let report = BenchReport {
            generated_at: "20250101_000000".to_string(),
            iterations: 3,
            static_checks: vec![StaticBenchRow {
                snippet: "fibonacci".to_string(),
                iterations: 3,
                total_ms: 1,
                mean_us: 333,
                deterministic: true,
            }],
            backends: Vec::new(),
        };
        let markdown = render_markdown(&report);
        assert!(markdown.contains("## Static checks"));
        assert!(!markdown.contains("## Review backends"));
    }
}
