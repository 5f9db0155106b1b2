use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use caregate_auth::{Controller, RouteDef, explain};

use crate::app::services::AppServices;
use crate::authz::{caller_ability, parse_action};
use crate::context::CurrentUser;

pub fn routes(prefix: &str) -> (Controller, Router) {
    let explain_path = format!("{prefix}/me/abilities/explain");

    let controller = Controller::new().route(RouteDef::get(&explain_path));
    let router = Router::new().route(&explain_path, get(explain_ability));

    (controller, router)
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub action: String,
    pub resource: String,
}

/// Why the current caller may (or may not) perform `action` on `resource`.
pub async fn explain_ability(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ExplainQuery>,
) -> Response {
    let action = match parse_action(&query.action) {
        Ok(action) => action,
        Err(response) => return response,
    };

    let ability = caller_ability(&services.abilities, &user);
    Json(explain(&ability, action, query.resource.as_str())).into_response()
}
