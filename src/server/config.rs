/**
 * Server Configuration
 *
 * Environment-driven configuration, read once at startup. The server
 * is resilient to missing optional pieces: no DATABASE_URL means the
 * in-memory store, no provider keys means those providers reject
 * sends, no JWT_SECRET means a development default with a loud
 * warning.
 */

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::store::{MemoryStore, PgStore, Store, StoreError};

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    /// Enables `POST /api/auth/dev-login`. Must stay off in production.
    pub dev_login_enabled: bool,
    pub lob_key: Option<String>,
    pub postgrid_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let dev_login_enabled = std::env::var("POSTBOX_DEV_LOGIN")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            port,
            database_url: std::env::var("DATABASE_URL").ok(),
            jwt_secret,
            allowed_origins,
            dev_login_enabled,
            lob_key: std::env::var("LOB_KEY").ok(),
            postgrid_key: std::env::var("POSTGRID_KEY").ok(),
        }
    }

    /// Configuration for tests: in-memory everything, dev login on.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            dev_login_enabled: true,
            lob_key: None,
            postgrid_key: None,
        }
    }
}

/// Build the process-wide store handle.
///
/// No `DATABASE_URL` means the in-memory store. A configured database
/// that cannot be reached, or whose schema cannot be applied, fails
/// startup; it never degrades to the in-memory store.
pub async fn load_store(config: &ServerConfig) -> Result<Arc<dyn Store>, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(|e| {
            tracing::error!("failed to connect to configured database: {e}");
            StoreError::Database(e)
        })?;
    let store = PgStore::new(pool).await.map_err(|e| {
        tracing::error!("failed to apply schema: {e}");
        e
    })?;
    tracing::info!("connected to PostgreSQL store");
    Ok(Arc::new(store))
}
