use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use social_stats::{api, store, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_stats=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let state: SharedState = Arc::new(
        AppState::build(config)
            .await
            .context("Failed to initialise application state")?,
    );
    info!(
        "Registered {} platforms, stats cache {}",
        state.registry.count(),
        if state.cache.is_enabled() { "enabled" } else { "disabled" }
    );

    let daemon_state = state.clone();
    tokio::spawn(async move {
        store::refresh_daemon(daemon_state).await;
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "Serving social stats");
    axum::serve(listener, app).await?;

    Ok(())
}
