/**
 * PostgreSQL Store
 *
 * sqlx-backed implementation of the store contract. One table per
 * collection, JSONB for the nested profile documents, and equality
 * indexes on the lowercase username columns that back the
 * case-insensitive lookups.
 *
 * The schema is applied idempotently at startup; there is no separate
 * migration pipeline.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::mail::model::{MailRecord, MailStatus, Provider};
use crate::store::{Store, StoreError};
use crate::users::model::{Customization, PostalAddress, UserPatch, UserRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL DEFAULT '',
    username_lower TEXT NOT NULL DEFAULT '',
    display_name TEXT,
    email TEXT,
    address JSONB,
    customization JSONB,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS users_username_lower_idx ON users (username_lower);

CREATE TABLE IF NOT EXISTS mail (
    id UUID PRIMARY KEY,
    from_username TEXT NOT NULL,
    from_username_lower TEXT NOT NULL,
    to_username TEXT NOT NULL,
    to_username_lower TEXT NOT NULL,
    subject TEXT,
    body TEXT NOT NULL,
    body_html TEXT NOT NULL,
    images JSONB NOT NULL DEFAULT '[]',
    status TEXT NOT NULL,
    provider TEXT NOT NULL,
    provider_ref TEXT,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS mail_to_username_lower_idx ON mail (to_username_lower, created_at DESC);
CREATE INDEX IF NOT EXISTS mail_from_username_lower_idx ON mail (from_username_lower, created_at DESC);
"#;

/// PostgreSQL store over a shared connection pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool and make sure the schema exists.
    pub async fn new(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

const USER_COLUMNS: &str =
    "id, username, username_lower, display_name, email, address, customization, created_at, updated_at";

const MAIL_COLUMNS: &str = "id, from_username, from_username_lower, to_username, to_username_lower, \
     subject, body, body_html, images, status, provider, provider_ref, created_at";

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    let address: Option<serde_json::Value> = row.try_get("address").map_err(StoreError::from)?;
    let address: Option<PostalAddress> = address
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("user address: {e}")))?;

    let customization: Option<serde_json::Value> =
        row.try_get("customization").map_err(StoreError::from)?;
    let customization: Option<Customization> = customization
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("user customization: {e}")))?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        username_lower: row.try_get("username_lower")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        address,
        customization,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn mail_from_row(row: &PgRow) -> Result<MailRecord, StoreError> {
    let status: String = row.try_get("status")?;
    let status = MailStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("mail status: {status}")))?;

    let provider: String = row.try_get("provider")?;
    let provider = Provider::parse(&provider)
        .ok_or_else(|| StoreError::Corrupt(format!("mail provider: {provider}")))?;

    let images: serde_json::Value = row.try_get("images")?;
    let images: Vec<String> = serde_json::from_value(images)
        .map_err(|e| StoreError::Corrupt(format!("mail images: {e}")))?;

    Ok(MailRecord {
        id: row.try_get("id")?,
        from_username: row.try_get("from_username")?,
        from_username_lower: row.try_get("from_username_lower")?,
        to_username: row.try_get("to_username")?,
        to_username_lower: row.try_get("to_username_lower")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        body_html: row.try_get("body_html")?,
        images,
        status,
        provider,
        provider_ref: row.try_get("provider_ref")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> Result<Option<serde_json::Value>, StoreError> {
    value
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("encode document: {e}")))
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn merge_user(&self, id: &str, patch: UserPatch) -> Result<(), StoreError> {
        let now = Utc::now();
        let address = to_json(&patch.address)?;
        let customization = to_json(&patch.customization)?;

        // Upsert with COALESCE per column gives set-with-merge
        // semantics: absent patch fields keep their stored value.
        sqlx::query(
            r#"
            INSERT INTO users (id, username, username_lower, display_name, email, address, customization, created_at, updated_at)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), $4, $5, $6, $7, $8, $8)
            ON CONFLICT (id) DO UPDATE SET
                username = COALESCE($2, users.username),
                username_lower = COALESCE($3, users.username_lower),
                display_name = COALESCE($4, users.display_name),
                email = COALESCE($5, users.email),
                address = COALESCE($6, users.address),
                customization = COALESCE($7, users.customization),
                updated_at = $8
            "#,
        )
        .bind(id)
        .bind(patch.username)
        .bind(patch.username_lower)
        .bind(patch.display_name)
        .bind(patch.email)
        .bind(address)
        .bind(customization)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username_lower = $1 AND username_lower <> ''"
        ))
        .bind(username_lower)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username_exact(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND username <> ''"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_mail(&self, record: &MailRecord) -> Result<(), StoreError> {
        let images = serde_json::to_value(&record.images)
            .map_err(|e| StoreError::Corrupt(format!("encode images: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO mail (id, from_username, from_username_lower, to_username, to_username_lower,
                              subject, body, body_html, images, status, provider, provider_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(&record.from_username)
        .bind(&record.from_username_lower)
        .bind(&record.to_username)
        .bind(&record.to_username_lower)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(&record.body_html)
        .bind(images)
        .bind(record.status.as_str())
        .bind(record.provider.as_str())
        .bind(&record.provider_ref)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_mail(&self, id: Uuid) -> Result<Option<MailRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {MAIL_COLUMNS} FROM mail WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(mail_from_row).transpose()
    }

    async fn patch_mail_status(
        &self,
        id: Uuid,
        status: MailStatus,
        provider_ref: Option<String>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE mail SET status = $1, provider_ref = COALESCE($2, provider_ref) WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(provider_ref)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_mail(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM mail WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_mail_to(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MAIL_COLUMNS} FROM mail WHERE to_username_lower = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(username_lower)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(mail_from_row).collect()
    }

    async fn list_mail_from(
        &self,
        username_lower: &str,
        limit: u32,
    ) -> Result<Vec<MailRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MAIL_COLUMNS} FROM mail WHERE from_username_lower = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(username_lower)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(mail_from_row).collect()
    }
}
