/**
 * Router Configuration
 *
 * Combines all route groups into a single Axum router. Authentication
 * is enforced per-handler through the `AuthUser` extractor, so public
 * and protected methods can share a path.
 */

use axum::response::Json;
use axum::Router;

use crate::routes::api_routes::{auth_routes, mail_routes, user_routes};
use crate::server::state::AppState;

/// `GET /api/health`
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Create the Axum router with all routes configured.
///
/// - `GET  /api/health` — liveness probe, public
/// - `/api/mail/*` — listings, send, delete (bearer auth)
/// - `/api/users/*` — username claim, existence, customization
/// - `POST /api/auth/dev-login` — development-only token minting
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(health))
        .merge(mail_routes())
        .merge(user_routes())
        .merge(auth_routes())
        .with_state(app_state)
}
