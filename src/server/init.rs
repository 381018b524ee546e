/**
 * Server Initialization
 *
 * Builds the application: configuration, store, courier, router, and
 * the CORS layer. An unset DATABASE_URL or unset provider keys degrade
 * features instead of preventing startup; a configured database that
 * cannot be reached fails startup.
 */

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::delivery::{HttpCourier, LetterCourier};
use crate::routes::router::create_router;
use crate::server::config::{load_store, ServerConfig};
use crate::server::state::AppState;

/// Create the Axum application from the environment.
pub async fn create_app() -> Result<Router, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        dev_login = config.dev_login_enabled,
        "initializing postbox backend"
    );

    let store = load_store(&config).await?;
    let courier: Arc<dyn LetterCourier> = Arc::new(HttpCourier::new(
        config.lob_key.clone(),
        config.postgrid_key.clone(),
    )?);

    Ok(create_app_with_state(AppState::new(store, courier, config)))
}

/// Assemble the router around prepared state. Tests call this with an
/// in-memory store and a fake courier.
pub fn create_app_with_state(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    create_router(state).layer(cors)
}

/// CORS from the configured origin list. A literal `*` opens the
/// surface wide (no credentials); an explicit list keeps credentials
/// support.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
