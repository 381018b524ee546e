/**
 * Mail Model
 *
 * This module defines the mail record stored in the `mail` collection
 * plus the request/response types for the mail endpoints.
 *
 * Addressing is username-canonical: records carry the denormalized
 * display usernames and their lowercase lookup forms, never internal
 * identity ids.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery provider selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    /// Store only, no delivery step.
    #[default]
    None,
    /// Simulated delivery, always succeeds without any network call.
    Manual,
    Lob,
    Postgrid,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Manual => "MANUAL",
            Self::Lob => "LOB",
            Self::Postgrid => "POSTGRID",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NONE" => Some(Self::None),
            "MANUAL" => Some(Self::Manual),
            "LOB" => Some(Self::Lob),
            "POSTGRID" => Some(Self::Postgrid),
            _ => None,
        }
    }

    /// True for providers that require an outbound delivery call.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Lob | Self::Postgrid)
    }
}

/// Mail lifecycle status. Transitions only move forward:
/// `DRAFT -> {SENT, FAILED}`, or created directly as `STORED` when no
/// delivery step follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MailStatus {
    Draft,
    Stored,
    Sent,
    Failed,
}

impl MailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Stored => "STORED",
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DRAFT" => Some(Self::Draft),
            "STORED" => Some(Self::Stored),
            "SENT" => Some(Self::Sent),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One letter. Append-only except for the status/providerRef patch
/// applied by the delivery step.
///
/// Serialization always supplies every declared field (`images` is an
/// empty list rather than absent) so clients never deal with
/// missing-vs-empty ambiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    pub id: Uuid,
    pub from_username: String,
    pub from_username_lower: String,
    pub to_username: String,
    pub to_username_lower: String,
    pub subject: Option<String>,
    pub body: String,
    pub body_html: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: MailStatus,
    pub provider: Provider,
    pub provider_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/mail/send`.
///
/// Accepts either `toHandle` or the legacy `username` field for the
/// recipient handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    #[serde(default)]
    pub to_handle: Option<String>,
    /// Legacy alias for `toHandle`, kept for older frontends.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub images: Vec<String>,
}

impl SendMailRequest {
    /// Recipient handle, preferring `toHandle` over the legacy alias.
    pub fn recipient(&self) -> Option<&str> {
        self.to_handle
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .or(self.username.as_deref())
    }
}

/// Query parameters for the inbox/outbox listings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Default and maximum page sizes for listings.
pub const DEFAULT_LIST_LIMIT: u32 = 20;
pub const MAX_LIST_LIMIT: u32 = 100;

/// Clamp a requested limit into the allowed 1..=100 range.
pub fn clamp_limit(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}
