use anyhow::{Context, Result};
use api::config::LogFormat;
use api::{AppConfig, AppState, build_router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let state = AppState::from_config(&config).context("Failed to build application state")?;

    if !state.classifier.extractor().is_ready() {
        tracing::warn!("GEMINI_API_KEY is not set; classification requests will fail");
    }
    if !state.classifier.auth_enabled() {
        tracing::warn!("API_KEY is not set; accepting requests without an x-api-key header");
    }

    tracing::info!(
        model = %config.gemini.model,
        pacing_ms = config.batch.pacing_ms,
        max_upload_bytes = config.limits.max_upload_bytes,
        "Configuration loaded"
    );

    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
