//! # parley-server
//!
//! HTTP backend for Parley: one-to-one chats and groups with messages,
//! replies, forwards, read receipts and comments.
//!
//! This binary provides:
//! - **REST API** (axum) over the conversation core
//! - **Bearer identity resolution** before any handler logic runs
//! - **SQLite persistence** opened from `DATABASE_PATH`

mod api;
mod auth;
mod config;
mod error;

use std::sync::Arc;

use anyhow::Context;
use parley_shared::constants::APP_NAME;
use parley_store::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::auth::UserIdBearer;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,parley_server=debug")),
        )
        .init();

    info!("Starting {APP_NAME} server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // Open the store (runs pending migrations)
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)
            .with_context(|| format!("opening database at {}", path.display()))?,
        None => {
            info!("Using in-memory database, data will not survive a restart");
            Database::open_in_memory().context("opening in-memory database")?
        }
    };

    if let Some(path) = db.path() {
        info!(path = %path.display(), "Database ready");
    }

    let http_addr = config.http_addr;
    let app_state = AppState {
        db: Arc::new(db),
        resolver: Arc::new(UserIdBearer),
        config: Arc::new(config),
    };

    // Serve until the listener fails or Ctrl+C.
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
