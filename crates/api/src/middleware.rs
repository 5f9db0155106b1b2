use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use caregate_auth::{DedicatedGuard, GuardPipeline, InboundCall, RouteId, RouteMetadata, RouteTable};

use crate::app::errors::{auth_error_to_response, json_error};

/// Largest body the passkey guard will buffer.
const MAX_GUARD_BODY: usize = 64 * 1024;

#[derive(Clone)]
pub struct GuardState {
    pub pipeline: Arc<GuardPipeline>,
    pub routes: Arc<RouteTable>,
}

/// Run the guard pipeline for the matched route, then hand the identity
/// slots to the handler through request extensions.
pub async fn guard_middleware(State(state): State<GuardState>, req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let route_id = RouteId::new(req.method().as_str(), path);
    let Some(route) = state.routes.lookup(&route_id) else {
        tracing::warn!(route = %route_id, "route has no guard metadata; denying");
        return json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden");
    };

    let (parts, body) = req.into_parts();

    let mut call = InboundCall::new(route_id);
    for (name, value) in header_pairs(&parts.headers) {
        call = call.with_header(name, value);
    }
    if let Some(query) = parts.uri.query() {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            call = call.with_query(name, value);
        }
    }

    let body = if needs_body(&route) {
        let bytes = match axum::body::to_bytes(body, MAX_GUARD_BODY).await {
            Ok(bytes) => bytes,
            Err(_) => return json_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", "payload too large"),
        };
        match parse_json(&bytes) {
            Ok(Some(value)) => call = call.with_body(value),
            Ok(None) => {}
            Err(()) => return json_error(StatusCode::BAD_REQUEST, "invalid_body", "body must be JSON"),
        }
        Body::from(bytes)
    } else {
        body
    };

    if let Err(e) = state.pipeline.run(&mut call, &route).await {
        return auth_error_to_response(&e);
    }

    let mut req = Request::from_parts(parts, body);
    let (authentication, user) = call.into_slots();
    if let Some(authentication) = authentication {
        req.extensions_mut().insert(authentication);
    }
    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

fn needs_body(route: &RouteMetadata) -> bool {
    route.dedicated_guards().contains(&DedicatedGuard::Passkey)
}

fn parse_json(bytes: &Bytes) -> Result<Option<serde_json::Value>, ()> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some).map_err(|_| ())
}

fn header_pairs(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            pairs.entry(name.as_str().to_string()).or_insert_with(|| value.to_string());
        }
    }
    pairs
}
