use std::sync::Arc;

use anyhow::Context;

use intake_api::{AppConfig, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    intake_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = app::services::build_services(&config)
        .await
        .context("failed to initialise record store")?;
    tracing::info!(backend = services.backend_name(), "record store ready");

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
