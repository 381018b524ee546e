/**
 * Mail Record Indexer
 *
 * Creates, lists, and retracts mail records under the
 * username-canonical addressing regime: records are keyed by the
 * denormalized sender/recipient usernames and their lowercase forms.
 *
 * Send ordering guarantee: the record is persisted (STORED/DRAFT)
 * before any delivery dispatch, so it is visible to outbox queries
 * while delivery is in flight; status is patched at most once per
 * attempt and never regresses.
 */

use chrono::Utc;
use uuid::Uuid;

use crate::auth::tokens::CallerIdentity;
use crate::delivery::{DeliveryStatus, LetterCourier};
use crate::error::ApiError;
use crate::mail::model::{clamp_limit, MailRecord, MailStatus, Provider, SendMailRequest};
use crate::mail::render::render_html;
use crate::store::Store;
use crate::users::model::PostalAddress;
use crate::users::{directory, provision};

/// Simulated reference returned by the MANUAL provider.
const MANUAL_REFERENCE: &str = "simulated-local";

/// Orchestrates mail operations against the store and the delivery
/// collaborator.
pub struct MailIndexer<'a> {
    store: &'a dyn Store,
    courier: &'a dyn LetterCourier,
}

impl<'a> MailIndexer<'a> {
    pub fn new(store: &'a dyn Store, courier: &'a dyn LetterCourier) -> Self {
        Self { store, courier }
    }

    /// Send a letter to a handle.
    ///
    /// All validation happens before anything is persisted: an empty
    /// body, an unknown recipient, or a missing address produces no
    /// stored record. A delivery failure, by contrast, leaves the
    /// record persisted with `FAILED` status and surfaces a
    /// `DeliveryFailed` error.
    pub async fn send(
        &self,
        identity: &CallerIdentity,
        request: SendMailRequest,
    ) -> Result<MailRecord, ApiError> {
        let body = request.body.trim();
        if body.is_empty() {
            return Err(ApiError::invalid_argument("body is required"));
        }
        let handle = request
            .recipient()
            .ok_or_else(|| ApiError::invalid_argument("toHandle (recipient username) is required"))?;

        let recipient = directory::find_by_username(self.store, handle).await?;
        let (from_username, from_username_lower) =
            provision::resolve_or_provision_username(self.store, identity).await?;

        let provider = request.provider;
        let addresses = self.resolve_addresses(identity, &recipient.id, provider).await?;

        let subject = request
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let body_html = render_html(subject.as_deref(), body);

        // Legacy recipient records may lack the normalized form.
        let to_username_lower = if recipient.username_lower.is_empty() {
            recipient.username.to_lowercase()
        } else {
            recipient.username_lower.clone()
        };

        let mut record = MailRecord {
            id: Uuid::new_v4(),
            from_username,
            from_username_lower,
            to_username: recipient.username.clone(),
            to_username_lower,
            subject,
            body: body.to_string(),
            body_html,
            images: request.images,
            status: if provider == Provider::None {
                MailStatus::Stored
            } else {
                MailStatus::Draft
            },
            provider,
            provider_ref: None,
            created_at: Utc::now(),
        };
        self.store.insert_mail(&record).await?;
        tracing::info!(mail_id = %record.id, to = %record.to_username_lower, provider = provider.as_str(), "mail record created");

        match provider {
            Provider::None => Ok(record),
            Provider::Manual => {
                // Simulated delivery: immediate success, no courier call.
                self.store
                    .patch_mail_status(record.id, MailStatus::Sent, Some(MANUAL_REFERENCE.to_string()))
                    .await?;
                record.status = MailStatus::Sent;
                record.provider_ref = Some(MANUAL_REFERENCE.to_string());
                Ok(record)
            }
            Provider::Lob | Provider::Postgrid => {
                let (to_addr, from_addr) = addresses.ok_or_else(|| {
                    ApiError::Internal("addresses not resolved for external provider".to_string())
                })?;
                let outcome = self
                    .courier
                    .deliver(provider, &to_addr, &from_addr, &record.body_html)
                    .await;

                match outcome.status {
                    DeliveryStatus::Sent => {
                        self.store
                            .patch_mail_status(record.id, MailStatus::Sent, outcome.reference.clone())
                            .await?;
                        record.status = MailStatus::Sent;
                        record.provider_ref = outcome.reference;
                        Ok(record)
                    }
                    DeliveryStatus::Failed => {
                        let reason = outcome
                            .reference
                            .unwrap_or_else(|| "unknown provider error".to_string());
                        self.store
                            .patch_mail_status(record.id, MailStatus::Failed, Some(reason.clone()))
                            .await?;
                        Err(ApiError::DeliveryFailed {
                            provider: provider.as_str().to_string(),
                            reason,
                        })
                    }
                }
            }
        }
    }

    /// Validate provider configuration and gather postal addresses for
    /// external sends. Runs before any record is created.
    async fn resolve_addresses(
        &self,
        identity: &CallerIdentity,
        recipient_id: &str,
        provider: Provider,
    ) -> Result<Option<(PostalAddress, PostalAddress)>, ApiError> {
        if !provider.is_external() {
            return Ok(None);
        }
        if !self.courier.supports(provider) {
            return Err(ApiError::invalid_argument(format!(
                "{} key not configured",
                provider.as_str()
            )));
        }

        let to_addr = self
            .store
            .get_user(recipient_id)
            .await?
            .and_then(|u| u.address)
            .ok_or_else(|| ApiError::invalid_argument("Recipient address missing"))?;

        // A sender without an address borrows the recipient's.
        let from_addr = self
            .store
            .get_user(&identity.id)
            .await?
            .and_then(|u| u.address)
            .unwrap_or_else(|| to_addr.clone());

        Ok(Some((to_addr, from_addr)))
    }

    /// Mail addressed to the caller, newest first.
    pub async fn list_inbox(
        &self,
        identity: &CallerIdentity,
        limit: Option<u32>,
    ) -> Result<Vec<MailRecord>, ApiError> {
        let (_, lower) = provision::resolve_or_provision_username(self.store, identity).await?;
        Ok(self.store.list_mail_to(&lower, clamp_limit(limit)).await?)
    }

    /// Mail sent by the caller, newest first.
    pub async fn list_outbox(
        &self,
        identity: &CallerIdentity,
        limit: Option<u32>,
    ) -> Result<Vec<MailRecord>, ApiError> {
        let (_, lower) = provision::resolve_or_provision_username(self.store, identity).await?;
        Ok(self.store.list_mail_from(&lower, clamp_limit(limit)).await?)
    }

    /// Permanently delete a mail record. Only the recipient may
    /// retract; there is no soft delete.
    pub async fn delete(&self, identity: &CallerIdentity, mail_id: Uuid) -> Result<(), ApiError> {
        let record = self
            .store
            .get_mail(mail_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Mail not found"))?;

        let (_, lower) = provision::resolve_or_provision_username(self.store, identity).await?;
        if record.to_username_lower != lower {
            return Err(ApiError::forbidden("Not authorized to delete this mail"));
        }

        if !self.store.delete_mail(mail_id).await? {
            return Err(ApiError::not_found("Mail not found"));
        }
        tracing::info!(%mail_id, "mail record deleted");
        Ok(())
    }
}
