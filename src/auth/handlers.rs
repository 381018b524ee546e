/**
 * Dev Login Handler
 *
 * Development-only shortcut that mints a bearer token for a username,
 * creating the underlying identity if it does not exist yet. Gated by
 * `POSTBOX_DEV_LOGIN`; when the gate is off the route answers 404 so
 * production deployments do not advertise it.
 */

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::directory;

#[derive(Debug, Deserialize)]
pub struct DevLoginRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevLoginResponse {
    pub token: String,
    pub id: String,
    pub username: String,
    pub username_lower: String,
}

/// `POST /api/auth/dev-login`
pub async fn dev_login(
    State(state): State<AppState>,
    Json(request): Json<DevLoginRequest>,
) -> Result<Json<DevLoginResponse>, ApiError> {
    if !state.config.dev_login_enabled {
        return Err(ApiError::not_found("Not found"));
    }

    let store = state.store.as_ref();
    let id = match directory::find_by_username(store, &request.username).await {
        Ok(record) => record.id,
        Err(ApiError::NotFound(_)) => format!("dev-{}", Uuid::new_v4()),
        Err(other) => return Err(other),
    };

    let (username, username_lower) =
        directory::claim_username(store, &id, &request.username).await?;

    let token = state
        .tokens
        .create_token(&id, None, Some(username.clone()))
        .map_err(|e| ApiError::Internal(format!("token creation failed: {e}")))?;

    tracing::warn!(%username, "dev login issued");
    Ok(Json(DevLoginResponse {
        token,
        id,
        username,
        username_lower,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::HttpCourier;
    use crate::server::config::ServerConfig;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn state(dev_login_enabled: bool) -> AppState {
        let mut config = ServerConfig::for_tests();
        config.dev_login_enabled = dev_login_enabled;
        AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(HttpCourier::new(None, None).unwrap()),
            config,
        )
    }

    #[tokio::test]
    async fn test_gate_off_hides_the_route() {
        let result = dev_login(
            State(state(false)),
            Json(DevLoginRequest {
                username: "cole".to_string(),
            }),
        )
        .await;
        assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_gate_on_claims_and_mints() {
        let app_state = state(true);
        let Json(response) = dev_login(
            State(app_state.clone()),
            Json(DevLoginRequest {
                username: "@Cole".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.username, "Cole");
        assert_eq!(response.username_lower, "cole");
        let claims = app_state.tokens.verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, response.id);
    }
}
