use std::sync::Arc;

use caregate_api::app::{build_app, services::seed_demo_identities};
use caregate_infra::{AppConfig, InMemoryIdentityStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    caregate_observability::init(&AppConfig::log_from_env()?);
    let config = AppConfig::from_env()?;

    let identities = Arc::new(InMemoryIdentityStore::new());
    if std::env::var("CAREGATE_DEMO_SEED").is_ok_and(|v| v == "true") {
        let demo = seed_demo_identities(&identities)?;
        tracing::warn!(
            admin = %demo.admin,
            nutritionist = %demo.nutritionist,
            psychologist = %demo.psychologist,
            responsable = %demo.responsable,
            "demo identities seeded"
        );
    }

    let port = config.server.port;
    let app = build_app(config, identities)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
