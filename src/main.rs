mod api_doc;
mod config;
mod criteria;
mod engine;
mod error;
mod handlers;
mod models;
mod response;
mod routes;
mod state;
mod store;
mod survey;

use anyhow::Context;
use config::Config;
use state::AppState;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG from it reaches the subscriber
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    tracing::info!("survey-response-filter starting");

    let config = Config::from_env()?;
    config.log_startup();

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let app = routes::app(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
