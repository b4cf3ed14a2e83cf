use std::{path::Path, sync::Arc};

use api_router::{api_routes_v1, api_state::ApiState};
use axum::{extract::FromRef, Router};
use common::{
    models::checkpoint::EmbeddingCheckpoint,
    utils::{config::get_config, embedding::EmbeddingProvider},
};
use html_router::{html_routes, html_state::HtmlState};
use review_pipeline::ReviewDispatcher;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Create embedding provider based on config
    let embedding_provider = Arc::new(EmbeddingProvider::from_config(&config).await?);
    info!(
        embedding_backend = ?config.embedding_backend,
        embedding_dimension = embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    // Load the trained checkpoint when one exists and matches the provider
    let checkpoint = load_checkpoint(&config.checkpoint_path(), &embedding_provider);

    let dispatcher = Arc::new(ReviewDispatcher::from_config(
        &config,
        embedding_provider,
        checkpoint,
    ));

    let html_state = HtmlState::new(&config, dispatcher.clone(), None);
    let api_state = ApiState::new(&config, dispatcher);

    // Create Axum router
    let app = Router::new()
        .nest("/api/v1", api_routes_v1(&api_state))
        .merge(html_routes(&html_state))
        .with_state(AppState {
            api_state,
            html_state,
        });

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_checkpoint(path: &str, provider: &EmbeddingProvider) -> Option<EmbeddingCheckpoint> {
    if !Path::new(path).exists() {
        info!(path, "No embedding checkpoint found; cohort matching disabled");
        return None;
    }

    match EmbeddingCheckpoint::load(Path::new(path)) {
        Ok(checkpoint) => {
            if checkpoint.dimension != provider.dimension()
                || checkpoint.backend != provider.backend_label()
            {
                warn!(
                    path,
                    checkpoint_backend = %checkpoint.backend,
                    checkpoint_dimension = checkpoint.dimension,
                    provider_backend = provider.backend_label(),
                    provider_dimension = provider.dimension(),
                    "Checkpoint does not match the configured embedding provider; ignoring it"
                );
                return None;
            }
            info!(
                path,
                centroids = checkpoint.centroids.len(),
                "Loaded embedding checkpoint"
            );
            Some(checkpoint)
        }
        Err(err) => {
            warn!(path, error = %err, "Failed to load embedding checkpoint");
            None
        }
    }
}

#[derive(Clone, FromRef)]
struct AppState {
    api_state: ApiState,
    html_state: HtmlState,
}
