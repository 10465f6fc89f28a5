//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use parley_shared::constants::{DEFAULT_HTTP_PORT, DEFAULT_MAX_BODY_SIZE};

/// Literal `DATABASE_PATH` value that selects an in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// SQLite database file. `None` keeps everything in memory.
    /// Env: `DATABASE_PATH` (`:memory:` for an in-memory store)
    /// Default: `./parley.db`
    pub database_path: Option<PathBuf>,

    /// Maximum accepted request body in bytes.
    /// Env: `MAX_BODY_SIZE`
    /// Default: 1 MiB
    pub max_body_size: usize,

    /// Allowed CORS origin. `None` allows any origin.
    /// Env: `CORS_ALLOW_ORIGIN`
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: Some(PathBuf::from("./parley.db")),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            cors_allow_origin: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            let path = path.trim();
            if path == IN_MEMORY {
                config.database_path = None;
            } else if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("MAX_BODY_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_BODY_SIZE, using default"),
            }
        }

        if let Some(origin) = lookup("CORS_ALLOW_ORIGIN") {
            let origin = origin.trim();
            if !origin.is_empty() && origin != "*" {
                config.cors_allow_origin = Some(origin.to_string());
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
