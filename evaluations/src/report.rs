use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

pub fn format_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Writes the JSON and Markdown renditions of a report next to each
/// other under `dir`, stamped so successive runs never collide.
pub fn write_reports<T: Serialize>(
    dir: &Path,
    stem: &str,
    report: &T,
    markdown: &str,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating report directory {}", dir.display()))?;

    let timestamp = format_timestamp();
    let json_path = dir.join(format!("{stem}_{timestamp}.json"));
    let markdown_path = dir.join(format!("{stem}_{timestamp}.md"));

    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("writing {}", json_path.display()))?;
    std::fs::write(&markdown_path, markdown)
        .with_context(|| format!("writing {}", markdown_path.display()))?;

    info!(
        json = %json_path.display(),
        markdown = %markdown_path.display(),
        "Wrote reports"
    );
    Ok(ReportPaths {
        json: json_path,
        markdown: markdown_path,
    })
}
