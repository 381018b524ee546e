/**
 * Application State Management
 *
 * Central state container for the Axum application: the store handle,
 * the delivery courier, the token authority, and the configuration.
 * Everything is constructed once at process start and shared across
 * requests; no per-request mutable state exists outside the store.
 *
 * `FromRef` implementations let handlers extract just the piece they
 * need instead of the whole `AppState`.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::tokens::TokenAuthority;
use crate::delivery::LetterCourier;
use crate::server::config::ServerConfig;
use crate::store::Store;

/// Shared application state.
///
/// All fields are cheap to clone: the store and courier are `Arc`ed
/// trait objects, which also makes them substitutable in tests.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide store handle, safely shared across requests.
    pub store: Arc<dyn Store>,
    /// Delivery collaborator for external providers.
    pub courier: Arc<dyn LetterCourier>,
    /// Signs and verifies bearer tokens.
    pub tokens: TokenAuthority,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        courier: Arc<dyn LetterCourier>,
        config: ServerConfig,
    ) -> Self {
        let tokens = TokenAuthority::new(config.jwt_secret.clone());
        Self {
            store,
            courier,
            tokens,
            config: Arc::new(config),
        }
    }

    /// In-memory state with the given secret, for unit tests.
    #[cfg(test)]
    pub fn for_tests(secret: &str) -> Self {
        use crate::delivery::HttpCourier;
        use crate::store::MemoryStore;

        let mut config = ServerConfig::for_tests();
        config.jwt_secret = secret.to_string();
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(HttpCourier::new(None, None).expect("reqwest client")),
            config,
        )
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn LetterCourier> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.courier.clone()
    }
}

impl FromRef<AppState> for TokenAuthority {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
