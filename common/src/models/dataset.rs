use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// A single labelled code snippet. Labels are small integers; when no
/// curated label exists they are derived heuristically from the snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingSample {
    pub code: String,
    pub label: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub source: String,
    pub sample_count: usize,
    pub created_at: DateTime<Utc>,
}

/// On-disk training dataset pairing code snippets with heuristic labels.
/// Schema validity is the only invariant; the file is written once at
/// dataset-creation time and read back at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub samples: Vec<TrainingSample>,
    pub metadata: DatasetMetadata,
}

/// Number of heuristic label buckets.
pub const LABEL_BUCKETS: usize = 10;

/// Heuristic label when none is provided: snippet line count folded into
/// a fixed number of buckets.
pub fn heuristic_label(code: &str) -> usize {
    code.lines().count() % LABEL_BUCKETS
}

impl TrainingDataset {
    pub fn new(samples: Vec<TrainingSample>, source: impl Into<String>) -> Self {
        let metadata = DatasetMetadata {
            source: source.into(),
            sample_count: samples.len(),
            created_at: Utc::now(),
        };
        Self { samples, metadata }
    }

    pub fn from_snippets(snippets: Vec<String>, source: impl Into<String>) -> Self {
        let samples = snippets
            .into_iter()
            .filter(|code| !code.trim().is_empty())
            .map(|code| {
                let label = heuristic_label(&code);
                TrainingSample { code, label }
            })
            .collect();
        Self::new(samples, source)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let dataset: Self = serde_json::from_str(&raw)?;
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Stable content fingerprint, stored in the checkpoint so a stale
    /// checkpoint can be tied back to the dataset that produced it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for sample in &self.samples {
            hasher.update(sample.code.as_bytes());
            hasher.update(sample.label.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn label_histogram(&self) -> Vec<(usize, usize)> {
        let mut counts = vec![0usize; LABEL_BUCKETS];
        for sample in &self.samples {
            if let Some(slot) = counts.get_mut(sample.label % LABEL_BUCKETS) {
                *slot += 1;
            }
        }
        counts
            .into_iter()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_label_is_line_count_bucket() {
        assert_eq!(heuristic_label("a = 1"), 1);
        let twelve_lines = "x = 1\n".repeat(12);
        assert_eq!(heuristic_label(&twelve_lines), 2);
    }

    #[test]
    fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dataset.json");

        let dataset = TrainingDataset::from_snippets(
            vec!["def f():\n    return 1\n".into(), "   ".into()],
            "unit-test",
        );
        // Blank snippet is dropped
        assert_eq!(dataset.samples.len(), 1);

        dataset.save(&path).expect("save dataset");
        let loaded = TrainingDataset::load(&path).expect("load dataset");
        assert_eq!(loaded.samples, dataset.samples);
        assert_eq!(loaded.fingerprint(), dataset.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = TrainingDataset::from_snippets(vec!["print(1)\n".into()], "a");
        let b = TrainingDataset::from_snippets(vec!["print(2)\n".into()], "a");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
