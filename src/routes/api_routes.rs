/**
 * API Route Groups
 *
 * One function per route group; the router module merges them.
 */

use axum::routing::{delete, get, post};
use axum::Router;

use crate::auth::handlers::dev_login;
use crate::mail::handlers::{delete_mail, inbox, outbox, send};
use crate::server::state::AppState;
use crate::users::handlers::{
    claim_username, get_customization, set_customization, username_exists,
};

/// Mail endpoints. All of them require bearer auth.
pub fn mail_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mail/inbox", get(inbox))
        .route("/api/mail/outbox", get(outbox))
        .route("/api/mail/send", post(send))
        .route("/api/mail/{mail_id}", delete(delete_mail))
}

/// User endpoints. Existence and customization reads are public;
/// claiming and customization writes require auth.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/me/username", post(claim_username))
        .route("/api/users/exists", get(username_exists))
        .route(
            "/api/users/{username}/customization",
            get(get_customization).post(set_customization),
        )
}

/// Auth endpoints. Only the gated dev login lives here; real token
/// verification happens in the extractor.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/dev-login", post(dev_login))
}
