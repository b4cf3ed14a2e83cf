use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::models::dataset::TrainingDataset;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directories that never hold training material.
const SKIP_DIRS: &[&str] = &["venv", ".venv", "__pycache__", "node_modules", "site-packages"];

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    // The walk root itself is always kept, whatever it is named.
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') || SKIP_DIRS.contains(&name))
}

/// Collects .py files under `root`, skipping hidden and environment
/// directories. Paths come back sorted so dataset builds are stable.
pub fn collect_python_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "py")
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Reads every collected file into a labelled dataset. Unreadable files
/// are skipped with a log line rather than aborting the scan.
pub fn build_from_directory(root: &Path, limit: Option<usize>) -> Result<TrainingDataset> {
    let files = collect_python_files(root)
        .with_context(|| format!("scanning {} for Python files", root.display()))?;

    let mut snippets = Vec::new();
    for path in &files {
        if limit.is_some_and(|cap| snippets.len() >= cap) {
            break;
        }
        match std::fs::read_to_string(path) {
            Ok(code) => snippets.push(code),
            Err(err) => debug!(path = %path.display(), error = %err, "Skipping unreadable file"),
        }
    }

    info!(
        root = %root.display(),
        files = files.len(),
        samples = snippets.len(),
        "Built dataset from directory"
    );
    Ok(TrainingDataset::from_snippets(
        snippets,
        root.display().to_string(),
    ))
}

/// `create-dataset` entry point.
pub fn run_create(args: &crate::args::CreateDatasetArgs) -> Result<()> {
    let dataset = build_from_directory(&args.source_dir, args.limit)?;
    if dataset.samples.is_empty() {
        anyhow::bail!(
            "no Python files found under {}",
            args.source_dir.display()
        );
    }

    crate::args::ensure_parent(&args.output)?;
    dataset
        .save(&args.output)
        .with_context(|| format!("saving dataset {}", args.output.display()))?;

    println!(
        "Wrote {} sample(s) to {} (labels: {:?})",
        dataset.samples.len(),
        args.output.display(),
        dataset.label_histogram()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, content).expect("write");
    }

    #[test]
    fn collects_only_python_files_outside_env_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "app.py", "x = 1\n");
        write(dir.path(), "pkg/util.py", "y = 2\n");
        write(dir.path(), "notes.txt", "not code");
        write(dir.path(), "venv/lib.py", "ignored = True\n");
        write(dir.path(), ".hidden/secret.py", "ignored = True\n");
        write(dir.path(), "__pycache__/cached.py", "ignored = True\n");

        let files = collect_python_files(dir.path()).expect("collect");
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["app.py", "util.py"]);
    }

    #[test]
    fn directory_build_honours_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a.py", "a = 1\n");
        write(dir.path(), "b.py", "b = 2\n");
        write(dir.path(), "c.py", "c = 3\n");

        let dataset = build_from_directory(dir.path(), Some(2)).expect("dataset");
        assert_eq!(dataset.samples.len(), 2);
        assert_eq!(dataset.metadata.sample_count, 2);
    }
}
