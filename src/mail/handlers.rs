/**
 * Mail HTTP Handlers
 *
 * Thin handlers over the mail record indexer: inbox/outbox listings,
 * send, and recipient-only delete.
 */

use axum::extract::{Path, Query, State};
use axum::response::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::mail::indexer::MailIndexer;
use crate::mail::model::{ListParams, MailRecord, SendMailRequest};
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

/// `GET /api/mail/inbox`
pub async fn inbox(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MailRecord>>, ApiError> {
    let indexer = MailIndexer::new(state.store.as_ref(), state.courier.as_ref());
    let records = indexer.list_inbox(&identity, params.limit).await?;
    Ok(Json(records))
}

/// `GET /api/mail/outbox`
pub async fn outbox(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MailRecord>>, ApiError> {
    let indexer = MailIndexer::new(state.store.as_ref(), state.courier.as_ref());
    let records = indexer.list_outbox(&identity, params.limit).await?;
    Ok(Json(records))
}

/// `POST /api/mail/send`
pub async fn send(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(request): Json<SendMailRequest>,
) -> Result<Json<MailRecord>, ApiError> {
    tracing::info!(
        sender = %identity.id,
        provider = request.provider.as_str(),
        "send mail request"
    );
    let indexer = MailIndexer::new(state.store.as_ref(), state.courier.as_ref());
    let record = indexer.send(&identity, request).await?;
    Ok(Json(record))
}

/// `DELETE /api/mail/{mail_id}`
pub async fn delete_mail(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(mail_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let indexer = MailIndexer::new(state.store.as_ref(), state.courier.as_ref());
    indexer.delete(&identity, mail_id).await?;
    Ok(Json(serde_json::json!({ "ok": true, "id": mail_id })))
}
