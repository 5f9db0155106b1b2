use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use caregate_auth::{Controller, RouteDef};

use crate::context::{CurrentAuthentication, CurrentUser, RequestContext};

pub fn routes(prefix: &str) -> (Controller, Router) {
    let whoami = format!("{prefix}/whoami");

    let controller = Controller::new()
        .route(RouteDef::get("/health").public())
        .route(RouteDef::get(&whoami));

    let router = Router::new()
        .route("/health", get(health))
        .route(&whoami, get(whoami_handler));

    (controller, router)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami_handler(
    CurrentUser(user): CurrentUser,
    CurrentAuthentication(authentication): CurrentAuthentication,
    context: RequestContext,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": user.id,
        "user_type": user.user_type,
        "is_admin": user.is_admin,
        "profile": user.profile,
        "permissions": user.permissions,
        "authentication": authentication,
        "log_id": context.log_id,
    }))
}
