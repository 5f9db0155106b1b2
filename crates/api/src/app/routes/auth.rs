use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};

use caregate_auth::{Controller, RouteDef};

use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::CurrentAuthentication;

pub fn routes(prefix: &str) -> (Controller, Router) {
    let google = format!("{prefix}/auth/sign-in/oauth/google");
    let callback = format!("{google}/callback");
    let passkey = format!("{prefix}/auth/sign-in/passkey");

    let controller = Controller::new()
        .route(RouteDef::get(&google).public())
        .route(RouteDef::get(&callback).google_auth())
        .route(RouteDef::post(&passkey).passkey_auth());

    let router = Router::new()
        .route(&google, get(google_sign_in))
        .route(&callback, get(google_callback))
        .route(&passkey, post(passkey_sign_in));

    (controller, router)
}

/// Send the browser to Google's consent screen.
pub async fn google_sign_in(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match &services.google {
        Some(google) => Redirect::temporary(google.authorization_url().as_str()).into_response(),
        None => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            "federated login is not configured",
        ),
    }
}

pub async fn google_callback(CurrentAuthentication(authentication): CurrentAuthentication) -> impl IntoResponse {
    Json(serde_json::json!({ "authentication": authentication }))
}

pub async fn passkey_sign_in(CurrentAuthentication(authentication): CurrentAuthentication) -> impl IntoResponse {
    Json(serde_json::json!({ "authentication": authentication }))
}
