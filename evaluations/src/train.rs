use anyhow::{bail, Context, Result};
use chrono::Utc;
use common::models::{
    checkpoint::{build_centroids, EmbeddingCheckpoint},
    dataset::TrainingDataset,
};
use tracing::info;

use crate::{
    args::{ensure_parent, EmbeddingArgs, TrainArgs},
    dataset, provider,
};

pub async fn run(args: &TrainArgs, embedding: &EmbeddingArgs) -> Result<()> {
    let mut dataset = match (&args.dataset, &args.source_dir) {
        (Some(path), None) => TrainingDataset::load(path)
            .with_context(|| format!("loading dataset {}", path.display()))?,
        (None, Some(dir)) => dataset::build_from_directory(dir, args.limit)?,
        _ => bail!("train needs exactly one of --dataset or --source-dir"),
    };

    if let Some(limit) = args.limit {
        dataset.samples.truncate(limit);
    }
    if dataset.samples.is_empty() {
        bail!("dataset holds no samples; nothing to train on");
    }

    let fingerprint = dataset.fingerprint();
    info!(
        samples = dataset.samples.len(),
        labels = ?dataset.label_histogram(),
        "Training dataset loaded"
    );

    let provider = provider::build_provider(embedding).await?;
    let codes: Vec<String> = dataset
        .samples
        .iter()
        .map(|sample| sample.code.clone())
        .collect();
    let vectors = provider
        .embed_batch(codes)
        .await
        .context("embedding training samples")?;

    let labelled: Vec<(usize, Vec<f32>)> = dataset
        .samples
        .iter()
        .map(|sample| sample.label)
        .zip(vectors)
        .collect();
    let centroids = build_centroids(&labelled).context("building label centroids")?;

    let checkpoint = EmbeddingCheckpoint {
        backend: provider.backend_label().to_string(),
        model_code: provider.model_code(),
        dimension: provider.dimension(),
        centroids,
        dataset_fingerprint: fingerprint,
        created_at: Utc::now(),
    };

    ensure_parent(&args.output)?;
    checkpoint
        .save(&args.output)
        .with_context(|| format!("saving checkpoint {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        centroids = checkpoint.centroids.len(),
        dimension = checkpoint.dimension,
        backend = %checkpoint.backend,
        "Checkpoint trained"
    );
    println!(
        "Trained {} centroid(s) over {} sample(s); checkpoint written to {}",
        checkpoint.centroids.len(),
        dataset.samples.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::args::EmbeddingBackend;

    use super::*;

    #[tokio::test]
    async fn trains_a_checkpoint_from_a_dataset_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset_path = dir.path().join("dataset.json");
        let output = dir.path().join("models/checkpoint.json");

        let dataset = TrainingDataset::from_snippets(
            vec![
                "x = 1\n".to_string(),
                "def f():\n    return 1\n".to_string(),
            ],
            "unit-test",
        );
        dataset.save(&dataset_path).expect("save dataset");

        let args = TrainArgs {
            dataset: Some(dataset_path),
            source_dir: None,
            output: output.clone(),
            limit_arg: 0,
            limit: None,
        };
        let embedding = EmbeddingArgs {
            embedding_backend: EmbeddingBackend::Hashed,
            embedding_model: None,
        };

        run(&args, &embedding).await.expect("train run");

        let checkpoint = EmbeddingCheckpoint::load(&output).expect("load checkpoint");
        assert_eq!(checkpoint.backend, "hashed");
        assert_eq!(checkpoint.dimension, crate::provider::HASHED_DIMENSION);
        assert_eq!(checkpoint.dataset_fingerprint, dataset.fingerprint());
        assert_eq!(checkpoint.centroids.len(), 2);
    }

    #[tokio::test]
    async fn empty_dataset_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset_path = dir.path().join("dataset.json");
        TrainingDataset::from_snippets(Vec::new(), "unit-test")
            .save(&dataset_path)
            .expect("save dataset");

        let args = TrainArgs {
            dataset: Some(dataset_path),
            source_dir: None,
            output: PathBuf::from("unused.json"),
            limit_arg: 0,
            limit: None,
        };
        let embedding = EmbeddingArgs {
            embedding_backend: EmbeddingBackend::Hashed,
            embedding_model: None,
        };

        assert!(run(&args, &embedding).await.is_err());
    }
}
