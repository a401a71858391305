use std::sync::Arc;

use anyhow::Context as _;

use tours_api::app::{build_app, AppServices};
use tours_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tours_observability::init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let services = Arc::new(AppServices::from_settings(&settings).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
