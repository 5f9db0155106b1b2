use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use caregate_auth::{Controller, RouteDef};

/// Machine-to-machine routes guarded by the custom token.
pub fn routes(prefix: &str) -> (Controller, Router) {
    let flush = format!("{prefix}/internal/cache/flush");

    let controller = Controller::new().route(RouteDef::post(&flush).custom_token());
    let router = Router::new().route(&flush, post(flush_cache));

    (controller, router)
}

pub async fn flush_cache() -> impl IntoResponse {
    tracing::info!("cache flush requested");
    (StatusCode::ACCEPTED, Json(serde_json::json!({ "flushed": true })))
}
