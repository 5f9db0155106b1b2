//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state handed to handlers
//! - `routes/`: HTTP routes + handlers, each file registers its own markers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use thiserror::Error;
use tower::ServiceBuilder;

use caregate_auth::strategies::{FederatedProfileSource, StaticAdminSecret};
use caregate_auth::{GuardPipeline, RouteTableError, StoreIdentityHydrator};
use caregate_infra::{AppConfig, ConfigError, GoogleOAuthClient, InMemoryIdentityStore, OAuthClientError};

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    OAuth(#[from] OAuthClientError),

    #[error(transparent)]
    Routes(#[from] RouteTableError),
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig, identities: Arc<InMemoryIdentityStore>) -> Result<Router, AppError> {
    let google = match &config.auth.google {
        Some(google) => Some(Arc::new(GoogleOAuthClient::new(google.clone())?) as Arc<dyn FederatedProfileSource>),
        None => None,
    };
    build_app_with(config, identities, google)
}

/// Same as [`build_app`] with an explicit federated profile source.
pub fn build_app_with(
    config: AppConfig,
    identities: Arc<InMemoryIdentityStore>,
    google: Option<Arc<dyn FederatedProfileSource>>,
) -> Result<Router, AppError> {
    let config = Arc::new(config);
    let services = Arc::new(services::AppServices::new(config.clone(), identities.clone(), google.clone()));

    let hydrator = StoreIdentityHydrator::new(identities.clone(), identities, services.permissions.clone());
    let mut pipeline = GuardPipeline::new(
        Arc::new(config.auth.jwt.verifier()?),
        Arc::new(hydrator),
        Arc::new(StaticAdminSecret::new(config.auth.admin_access_token.clone())),
    );
    if let Some(google) = google {
        pipeline = pipeline.with_google(google);
    }

    let prefix = format!("/api/{}", config.server.api_version);
    let (router, table) = routes::build(&prefix)?;
    tracing::info!(routes = table.len(), %prefix, "routes registered");

    let guard_state = middleware::GuardState {
        pipeline: Arc::new(pipeline),
        routes: Arc::new(table),
    };

    Ok(router
        .route_layer(axum::middleware::from_fn_with_state(guard_state, middleware::guard_middleware))
        .layer(ServiceBuilder::new().layer(Extension(services))))
}
