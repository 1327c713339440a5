use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use postperfect::anthropic::AnthropicClient;
use postperfect::config::Config;
use postperfect::create_router;
use postperfect::state::AppState;
use reqwest::Client;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let client = Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let model = Arc::new(AnthropicClient::new(
        client,
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        config.anthropic_base_url.clone(),
    ));

    info!("Using model {}", config.anthropic_model);
    info!("CORS allowed origins: {}", config.allowed_origins.join(", "));
    info!(
        "Rate limit: {} requests/minute ({})",
        config.rate_limit_per_minute,
        if config.rate_limit_per_ip { "per IP" } else { "per process" }
    );

    let state = Arc::new(AppState::from_config(&config, model));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
