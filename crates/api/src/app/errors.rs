use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use caregate_auth::{AuthError, ErrorKind};

/// Map a guard failure to a response. The body never says which check failed.
pub fn auth_error_to_response(err: &AuthError) -> axum::response::Response {
    match err.kind() {
        // The hydrator already logged the missing identity record at error level.
        ErrorKind::Unauthorized | ErrorKind::IdentityNotFound => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        ErrorKind::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
