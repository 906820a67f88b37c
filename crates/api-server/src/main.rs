//! API Server for the task manager
//!
//! This is the main entry point. It serves the task REST API backed by an
//! SQLite database.

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasks_core::task::{SqliteTaskStore, TaskValidator};

use crate::config::Config;
use crate::middleware::StaticApiKey;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasks_api=debug,tasks_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    if config.uses_default_api_key() {
        tracing::warn!("Using the built-in API key; set TASKS_API_KEY for real deployments");
    }

    tracing::info!("Using database: {}", config.database.url);
    let task_store = SqliteTaskStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    task_store
        .migrate()
        .await
        .context("Failed to migrate database")?;

    let app_state = AppState::new(
        Arc::new(task_store),
        TaskValidator::default(),
        Arc::new(StaticApiKey::new(config.api_key.clone())),
    );
    let app = routes::app(app_state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("REST API listening on {}", addr);
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
