/**
 * User HTTP Handlers
 *
 * Username claim, existence lookup, and profile customization.
 * Existence and customization reads are public; claiming and writing
 * customization require the caller to own the handle.
 */

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;
use crate::store::Store;
use crate::users::directory;
use crate::users::model::{Customization, UserPatch};

#[derive(Debug, Deserialize)]
pub struct ClaimUsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimUsernameResponse {
    pub username: String,
    pub username_lower: String,
}

/// `POST /api/users/me/username`
pub async fn claim_username(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(request): Json<ClaimUsernameRequest>,
) -> Result<Json<ClaimUsernameResponse>, ApiError> {
    let (username, username_lower) =
        directory::claim_username(state.store.as_ref(), &identity.id, &request.username).await?;
    tracing::info!(id = %identity.id, %username, "username claimed");
    Ok(Json(ClaimUsernameResponse {
        username,
        username_lower,
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct ExistsParams {
    #[serde(default)]
    pub username: Option<String>,
}

/// `GET /api/users/exists?username=`
pub async fn username_exists(
    State(state): State<AppState>,
    Query(params): Query<ExistsParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = params
        .username
        .as_deref()
        .ok_or_else(|| ApiError::invalid_argument("username query parameter is required"))?;
    let exists = directory::exists(state.store.as_ref(), username).await?;
    Ok(Json(serde_json::json!({ "exists": exists })))
}

/// `GET /api/users/{username}/customization`
///
/// Public read; a user without saved customization yields the default
/// (all-null) document rather than an error.
pub async fn get_customization(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Customization>, ApiError> {
    let record = directory::find_by_username(state.store.as_ref(), &username).await?;
    Ok(Json(record.customization.unwrap_or_default()))
}

/// `POST /api/users/{username}/customization`
///
/// Owner-only write: the authenticated identity must own the handle in
/// the path.
pub async fn set_customization(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(username): Path<String>,
    Json(customization): Json<Customization>,
) -> Result<Json<Customization>, ApiError> {
    let record = directory::find_by_username(state.store.as_ref(), &username).await?;
    if record.id != identity.id {
        return Err(ApiError::forbidden(
            "Not authorized to customize this profile",
        ));
    }

    state
        .store
        .merge_user(&identity.id, UserPatch::customization(customization.clone()))
        .await?;
    Ok(Json(customization))
}
