/**
 * In-Memory Store
 *
 * HashMap-backed implementation of the store contract. Used by every
 * test and as the fallback when no `DATABASE_URL` is configured, so a
 * dev server comes up with zero external services.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::mail::model::{MailRecord, MailStatus};
use crate::store::{Store, StoreError};
use crate::users::model::{UserPatch, UserRecord};

/// In-memory store. Cheap to construct, contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    mail: RwLock<HashMap<Uuid, MailRecord>>,
    user_merges: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `merge_user` calls so far. Tests use this to assert
    /// that idempotent paths perform no redundant writes.
    pub fn user_merge_count(&self) -> usize {
        self.user_merges.load(Ordering::SeqCst)
    }

    /// Number of mail records currently held.
    pub fn mail_count(&self) -> usize {
        self.mail.read().unwrap().len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn merge_user(&self, id: &str, patch: UserPatch) -> Result<(), StoreError> {
        self.user_merges.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().unwrap();
        let record = users
            .entry(id.to_string())
            .or_insert_with(|| UserRecord::new(id));
        patch.apply(record);
        Ok(())
    }

    async fn find_user_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| !u.username_lower.is_empty() && u.username_lower == username_lower)
            .cloned())
    }

    async fn find_user_by_username_exact(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| !u.username.is_empty() && u.username == username)
            .cloned())
    }

    async fn insert_mail(&self, record: &MailRecord) -> Result<(), StoreError> {
        self.mail.write().unwrap().insert(record.id, record.clone());
        Ok(())
    }

    async fn get_mail(&self, id: Uuid) -> Result<Option<MailRecord>, StoreError> {
        Ok(self.mail.read().unwrap().get(&id).cloned())
    }

    async fn patch_mail_status(
        &self,
        id: Uuid,
        status: MailStatus,
        provider_ref: Option<String>,
    ) -> Result<(), StoreError> {
        let mut mail = self.mail.write().unwrap();
        if let Some(record) = mail.get_mut(&id) {
            record.status = status;
            if provider_ref.is_some() {
                record.provider_ref = provider_ref;
            }
        }
        Ok(())
    }

    async fn delete_mail(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.mail.write().unwrap().remove(&id).is_some())
    }

    async fn list_mail_to(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError> {
        Ok(filtered(
            &self.mail.read().unwrap(),
            |r| r.to_username_lower == username_lower,
            limit,
        ))
    }

    async fn list_mail_from(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError> {
        Ok(filtered(
            &self.mail.read().unwrap(),
            |r| r.from_username_lower == username_lower,
            limit,
        ))
    }
}

fn filtered(
    mail: &HashMap<Uuid, MailRecord>,
    predicate: impl Fn(&MailRecord) -> bool,
    limit: u32,
) -> Vec<MailRecord> {
    let mut records: Vec<MailRecord> = mail.values().filter(|r| predicate(r)).cloned().collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit as usize);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::model::Provider;
    use chrono::{Duration, Utc};

    fn mail_record(to_lower: &str, created_offset_secs: i64) -> MailRecord {
        MailRecord {
            id: Uuid::new_v4(),
            from_username: "Jack".to_string(),
            from_username_lower: "jack".to_string(),
            to_username: "Cole".to_string(),
            to_username_lower: to_lower.to_string(),
            subject: None,
            body: "hi".to_string(),
            body_html: "<html></html>".to_string(),
            images: Vec::new(),
            status: MailStatus::Stored,
            provider: Provider::None,
            provider_ref: None,
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
        }
    }

    #[tokio::test]
    async fn test_merge_creates_then_updates() {
        let store = MemoryStore::new();
        store
            .merge_user("u1", UserPatch::username("Cole", "cole"))
            .await
            .unwrap();

        let mut patch = UserPatch::default();
        patch.display_name = Some("Cole M".to_string());
        store.merge_user("u1", patch).await.unwrap();

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.username, "Cole");
        assert_eq!(user.display_name.as_deref(), Some("Cole M"));
        assert_eq!(store.user_merge_count(), 2);
    }

    #[tokio::test]
    async fn test_username_lookups_skip_empty() {
        let store = MemoryStore::new();
        store.merge_user("u1", UserPatch::default()).await.unwrap();

        assert!(store
            .find_user_by_username_lower("")
            .await
            .unwrap()
            .is_none());
        assert!(store.find_user_by_username_exact("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_orders_newest_first_and_limits() {
        let store = MemoryStore::new();
        for offset in 0..5 {
            store.insert_mail(&mail_record("cole", offset)).await.unwrap();
        }

        let records = store.list_mail_to("cole", 3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].created_at >= records[1].created_at);
        assert!(records[1].created_at >= records[2].created_at);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryStore::new();
        let record = mail_record("cole", 0);
        store.insert_mail(&record).await.unwrap();

        assert!(store.delete_mail(record.id).await.unwrap());
        assert!(!store.delete_mail(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_patch_keeps_existing_provider_ref() {
        let store = MemoryStore::new();
        let record = mail_record("cole", 0);
        store.insert_mail(&record).await.unwrap();

        store
            .patch_mail_status(record.id, MailStatus::Sent, Some("ltr_123".to_string()))
            .await
            .unwrap();
        store
            .patch_mail_status(record.id, MailStatus::Sent, None)
            .await
            .unwrap();

        let stored = store.get_mail(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MailStatus::Sent);
        assert_eq!(stored.provider_ref.as_deref(), Some("ltr_123"));
    }
}
