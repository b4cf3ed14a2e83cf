pub mod error;
pub mod html_state;
mod render;
pub mod routes;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use html_state::HtmlState;
use routes::{index::index_handler, review::review_handler};
use tower_http::compression::CompressionLayer;

/// Html routes
pub fn html_routes<S>(app_state: &HtmlState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new()
        .route("/", get(index_handler))
        .route(
            "/analyze",
            post(review_handler).layer(DefaultBodyLimit::max(
                app_state.config.max_code_bytes.saturating_add(4096),
            )),
        )
        .layer(CompressionLayer::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use common::utils::{config::AppConfig, embedding::EmbeddingProvider};
    use http_body_util::BodyExt;
    use review_pipeline::ReviewDispatcher;
    use tower::ServiceExt;

    use super::*;

    fn test_router() -> Router {
        let config = AppConfig {
            embedding_backend: "hashed".to_string(),
            ollama_base_url: "http://127.0.0.1:1".to_string(),
            ..AppConfig::default()
        };
        let provider = Arc::new(EmbeddingProvider::new_hashed(64).expect("hashed provider"));
        let dispatcher = Arc::new(ReviewDispatcher::from_config(&config, provider, None));
        let state = HtmlState::new(&config, dispatcher, None);
        html_routes(&state).with_state(state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn index_page_renders_model_picker() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("<form"));
        assert!(body.contains("gemini-pro"));
    }

    #[tokio::test]
    async fn htmx_submission_returns_report_fragment() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header("HX-Request", "true")
                    .body(Body::from(
                        "code=def%20add(a%2C%20b)%3A%0A%20%20%20%20return%20a%20%2B%20b%0A&model=gemini-pro",
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Syntax"));
        assert!(body.contains("AI review"));
        assert!(!body.contains("<form"));
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header("HX-Request", "true")
                    .body(Body::from("code=%20%20"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
