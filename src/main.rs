use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cts_api::config::config;
use cts_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config().clone();
    let port = config.api.port;

    tracing::info!(
        environment = %config.environment,
        backend = %config.backend.url,
        "starting cts-api"
    );

    let state = AppState::from_config(config);
    let app = cts_api::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
