use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCentroid {
    pub label: usize,
    pub centroid: Vec<f32>,
    pub samples: usize,
}

/// Trained embedding-model artifact: one centroid per label over the
/// training dataset's embedding vectors. Written once by `evaluations
/// train`, read at startup by the embedding review backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCheckpoint {
    pub backend: String,
    pub model_code: Option<String>,
    pub dimension: usize,
    pub centroids: Vec<LabelCentroid>,
    pub dataset_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl EmbeddingCheckpoint {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let checkpoint: Self = serde_json::from_str(&raw)?;
        Ok(checkpoint)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Nearest-centroid classification by cosine similarity. Returns the
    /// winning label and its similarity, or None for an empty checkpoint
    /// or dimension mismatch.
    pub fn classify(&self, vector: &[f32]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for centroid in &self.centroids {
            if centroid.centroid.len() != vector.len() {
                continue;
            }
            let similarity = cosine_similarity(vector, &centroid.centroid);
            match best {
                Some((_, current)) if similarity <= current => {}
                _ => best = Some((centroid.label, similarity)),
            }
        }
        best
    }
}

/// Builds per-label centroids from embedded samples. Vectors with a
/// dimension differing from the first are rejected as a malformed batch.
pub fn build_centroids(
    labelled_vectors: &[(usize, Vec<f32>)],
) -> Result<Vec<LabelCentroid>, AppError> {
    let Some(dimension) = labelled_vectors.first().map(|(_, v)| v.len()) else {
        return Ok(Vec::new());
    };

    let mut sums: std::collections::BTreeMap<usize, (Vec<f32>, usize)> = Default::default();
    for (label, vector) in labelled_vectors {
        if vector.len() != dimension {
            return Err(AppError::Validation(format!(
                "embedding dimension mismatch: expected {dimension}, got {}",
                vector.len()
            )));
        }
        let entry = sums
            .entry(*label)
            .or_insert_with(|| (vec![0.0; dimension], 0));
        for (slot, value) in entry.0.iter_mut().zip(vector) {
            *slot += value;
        }
        entry.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(label, (mut sum, count))| {
            for value in &mut sum {
                *value /= count as f32;
            }
            LabelCentroid {
                label,
                centroid: sum,
                samples: count,
            }
        })
        .collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint_with(centroids: Vec<LabelCentroid>) -> EmbeddingCheckpoint {
        EmbeddingCheckpoint {
            backend: "hashed".into(),
            model_code: None,
            dimension: centroids.first().map_or(0, |c| c.centroid.len()),
            centroids,
            dataset_fingerprint: "test".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn centroids_average_per_label() {
        let vectors = vec![
            (1, vec![1.0, 0.0]),
            (1, vec![0.0, 1.0]),
            (2, vec![2.0, 2.0]),
        ];
        let centroids = build_centroids(&vectors).expect("centroids");
        assert_eq!(centroids.len(), 2);
        assert_eq!(centroids[0].label, 1);
        assert_eq!(centroids[0].centroid, vec![0.5, 0.5]);
        assert_eq!(centroids[0].samples, 2);
        assert_eq!(centroids[1].centroid, vec![2.0, 2.0]);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let vectors = vec![(0, vec![1.0, 0.0]), (0, vec![1.0])];
        assert!(build_centroids(&vectors).is_err());
    }

    #[test]
    fn classify_picks_nearest_centroid() {
        let checkpoint = checkpoint_with(vec![
            LabelCentroid {
                label: 3,
                centroid: vec![1.0, 0.0],
                samples: 1,
            },
            LabelCentroid {
                label: 7,
                centroid: vec![0.0, 1.0],
                samples: 1,
            },
        ]);
        let (label, similarity) = checkpoint.classify(&[0.9, 0.1]).expect("classification");
        assert_eq!(label, 3);
        assert!(similarity > 0.9);
    }

    #[test]
    fn classify_empty_checkpoint_is_none() {
        let checkpoint = checkpoint_with(Vec::new());
        assert!(checkpoint.classify(&[1.0, 0.0]).is_none());
    }

    #[test]
    fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models").join("checkpoint.json");

        let checkpoint = checkpoint_with(vec![LabelCentroid {
            label: 0,
            centroid: vec![0.25, 0.75],
            samples: 4,
        }]);
        checkpoint.save(&path).expect("save checkpoint");
        let loaded = EmbeddingCheckpoint::load(&path).expect("load checkpoint");
        assert_eq!(loaded.centroids.len(), 1);
        assert_eq!(loaded.centroids[0].centroid, vec![0.25, 0.75]);
    }
}
