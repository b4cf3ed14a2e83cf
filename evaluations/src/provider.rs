use anyhow::Result;
use common::utils::embedding::EmbeddingProvider;

use crate::args::{EmbeddingArgs, EmbeddingBackend};

pub const HASHED_DIMENSION: usize = 384;

pub async fn build_provider(args: &EmbeddingArgs) -> Result<EmbeddingProvider> {
    match args.embedding_backend {
        EmbeddingBackend::Hashed => EmbeddingProvider::new_hashed(HASHED_DIMENSION),
        EmbeddingBackend::FastEmbed => {
            EmbeddingProvider::new_fastembed(args.embedding_model.clone()).await
        }
    }
}
