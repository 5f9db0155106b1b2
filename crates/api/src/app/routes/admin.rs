use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use caregate_auth::{Controller, RouteDef};

use crate::app::errors::json_error;
use crate::app::services::AppServices;

/// Back-office routes: the whole controller requires the admin token.
pub fn routes(prefix: &str) -> (Controller, Router) {
    let configs = format!("{prefix}/admin/configs");

    let controller = Controller::new()
        .admin_token()
        .route(RouteDef::get(&configs))
        .route(RouteDef::put(&configs));

    let router = Router::new().route(&configs, get(get_configs).put(put_configs));

    (controller, router)
}

fn snapshot(services: &AppServices) -> Value {
    let settings = services
        .settings
        .read()
        .map(|s| Value::Object(s.clone()))
        .unwrap_or(Value::Null);

    serde_json::json!({
        "api_version": services.config.server.api_version,
        "port": services.config.server.port,
        "google_enabled": services.google.is_some(),
        "log_format": services.config.log.format,
        "settings": settings,
    })
}

pub async fn get_configs(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(snapshot(&services))
}

/// Merge a JSON object into the runtime settings.
pub async fn put_configs(Extension(services): Extension<Arc<AppServices>>, Json(body): Json<Value>) -> Response {
    let Value::Object(update) = body else {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "body must be a JSON object");
    };

    match services.settings.write() {
        Ok(mut settings) => settings.extend(update),
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "settings unavailable"),
    }

    tracing::info!("runtime settings updated");
    Json(snapshot(&services)).into_response()
}
