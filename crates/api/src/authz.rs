//! Handler-side ability helpers.
//!
//! Route-level policies are enforced by the guard pipeline; these helpers are
//! for handlers that need to inspect the caller's ability themselves.

use axum::http::StatusCode;
use axum::response::Response;

use caregate_auth::{Ability, AbilityFactory, Action, CallerIdentity};

use crate::app::errors::json_error;

/// Build the ability of the current caller. Never cached.
pub fn caller_ability(factory: &AbilityFactory, user: &CallerIdentity) -> Ability {
    factory.build(&user.permissions)
}

pub fn parse_action(raw: &str) -> Result<Action, Response> {
    raw.parse::<Action>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_action",
            "action must be one of: manage, read, write, delete",
        )
    })
}
