use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};

use caregate_auth::{Action, Controller, Resource, RouteDef, can};

use crate::app::services::AppServices;
use crate::authz::caller_ability;
use crate::context::CurrentUser;

pub fn routes(prefix: &str) -> (Controller, Router) {
    let base = format!("{prefix}/patients");

    let controller = Controller::new().route(RouteDef::get(&base).check_policy(can(Action::Read, Resource::Patients)));
    let router = Router::new().route(&base, get(list_patients));

    (controller, router)
}

/// Patient records live outside this service; the listing reports what the
/// caller may do with them.
pub async fn list_patients(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let ability = caller_ability(&services.abilities, &user);

    Json(serde_json::json!({
        "items": [],
        "can_write": ability.can(Action::Write, &Resource::Patients),
        "can_delete": ability.can(Action::Delete, &Resource::Patients),
    }))
}
