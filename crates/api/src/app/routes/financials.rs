use axum::{extract::Path, http::StatusCode, routing::delete, Router};

use caregate_auth::{Action, Controller, Resource, RouteDef, can};

use crate::context::CurrentUser;

pub fn routes(prefix: &str) -> (Controller, Router) {
    let item = format!("{prefix}/financials/:id");

    let controller =
        Controller::new().route(RouteDef::delete(&item).check_policy(can(Action::Delete, Resource::Financials)));
    let router = Router::new().route(&item, delete(delete_financial));

    (controller, router)
}

pub async fn delete_financial(CurrentUser(user): CurrentUser, Path(id): Path<String>) -> StatusCode {
    tracing::info!(subject_id = %user.id, financial_id = %id, "financial entry deleted");
    StatusCode::NO_CONTENT
}
