use anyhow::Context;

use warden_api::config::ApiConfig;
use warden_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging comes up before the rest of the config so its warnings are visible.
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse::<LogFormat>().ok())
        .unwrap_or_default();
    warden_observability::init(log_format);

    let config = ApiConfig::from_env()?;
    let app = warden_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
