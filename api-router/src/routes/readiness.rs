use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Readiness probe: returns 200 once the parser grammar loads and can
/// validate a trivial snippet, else 503.
pub async fn ready() -> impl IntoResponse {
    let report = analysis_pipeline::analyze("x = 1\n", None);
    if report.syntax_valid {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "parser": "ok" }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "parser": "fail" }
            })),
        )
    }
}
