//! Document Store Module
//!
//! Narrow contract over the backing store: per collection (`users`,
//! `mail`) it supports get-by-id, set-with-merge, status patch,
//! delete-by-id, and equality-filtered queries with a descending sort
//! on `created_at` and a row limit. No multi-document transactions.
//!
//! The trait is object-safe so the whole backend runs against a single
//! long-lived `Arc<dyn Store>` constructed at process start, and tests
//! substitute the in-memory implementation.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::mail::model::{MailRecord, MailStatus};
use crate::users::model::{UserPatch, UserRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Backing store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document failed to decode into its model type.
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Store operations used by the identity and mail subsystems.
///
/// Read/write calls are independently atomic at the single-document
/// level; uniqueness checks layered on top are check-then-write (see
/// the directory module).
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a user record by its stable id.
    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Set-with-merge onto the user record for `id`, creating the
    /// record if it does not exist. Only `Some` patch fields change.
    async fn merge_user(&self, id: &str, patch: UserPatch) -> Result<(), StoreError>;

    /// Equality lookup on the normalized username index.
    async fn find_user_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Exact-case lookup on the display username. Covers records that
    /// predate the normalized index.
    async fn find_user_by_username_exact(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new mail record.
    async fn insert_mail(&self, record: &MailRecord) -> Result<(), StoreError>;

    /// Fetch a mail record by id.
    async fn get_mail(&self, id: Uuid) -> Result<Option<MailRecord>, StoreError>;

    /// Patch status (and provider reference, when given) on a mail
    /// record. Applied at most once per delivery attempt.
    async fn patch_mail_status(
        &self,
        id: Uuid,
        status: MailStatus,
        provider_ref: Option<String>,
    ) -> Result<(), StoreError>;

    /// Hard-delete a mail record. Returns whether a record existed.
    async fn delete_mail(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Mail addressed to `username_lower`, newest first, capped at `limit`.
    async fn list_mail_to(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError>;

    /// Mail sent by `username_lower`, newest first, capped at `limit`.
    async fn list_mail_from(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError>;
}
