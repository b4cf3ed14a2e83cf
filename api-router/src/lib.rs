use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{analyze::analyze_code, liveness::live, models::list_models, readiness::ready};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probe endpoints for k8s/systemd
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let api = Router::new()
        .route(
            "/analyze",
            post(analyze_code).layer(DefaultBodyLimit::max(
                app_state.config.max_code_bytes.saturating_add(4096),
            )),
        )
        .route("/models", get(list_models));

    probes.merge(api)
}
