/**
 * Authentication Extractor
 *
 * Extracts and verifies the bearer token from the Authorization
 * header, yielding the caller's identity to handlers. Mandatory on
 * every mutating or listing endpoint; health, existence lookup, and
 * customization reads stay public.
 */

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::tokens::CallerIdentity;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Axum extractor for the authenticated caller.
///
/// Handlers that take `AuthUser` as a parameter reject unauthenticated
/// requests with 401 before any of their own logic runs.
#[derive(Clone, Debug)]
pub struct AuthUser(pub CallerIdentity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!("missing Authorization header");
                ApiError::unauthenticated("Missing bearer token")
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("invalid Authorization header format");
            ApiError::unauthenticated("Missing bearer token")
        })?;

        let claims = state.tokens.verify_token(token).map_err(|e| {
            tracing::warn!("token verification failed: {e}");
            ApiError::unauthenticated("Invalid token")
        })?;

        Ok(AuthUser(CallerIdentity::from(claims)))
    }
}
