/**
 * User Model
 *
 * This module defines the user record stored in the `users` collection
 * and the merge patch used for partial writes.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Postal address needed by the physical-mail providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostalAddress {
    pub name: String,
    pub line1: String,
    pub city: String,
    pub region: String,
    pub postal: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "US".to_string()
}

/// In-game avatar position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Profile customization, opaque to the identity and indexing logic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Customization {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub hat: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
}

/// User record, one per end-user.
///
/// `id` is the stable identity-provider id assigned at first
/// authentication. `username` holds display case, `username_lower` the
/// normalized lookup key; the pair exists because the backing store
/// only supports exact-match queries. `username_lower` must be unique
/// across all records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// Empty until chosen by the user or auto-provisioned.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub username_lower: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<PostalAddress>,
    #[serde(default)]
    pub customization: Option<Customization>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Fresh record with no username; created on first authentication.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            username: String::new(),
            username_lower: String::new(),
            display_name: None,
            email: None,
            address: None,
            customization: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once a username has been claimed or provisioned.
    pub fn has_username(&self) -> bool {
        !self.username.is_empty()
    }
}

/// Partial update with set-with-merge semantics: only `Some` fields are
/// written, everything else on the record is left alone.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub username_lower: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<PostalAddress>,
    pub customization: Option<Customization>,
}

impl UserPatch {
    /// Patch that claims a username (both display and lookup forms).
    pub fn username(username: impl Into<String>, username_lower: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            username_lower: Some(username_lower.into()),
            ..Self::default()
        }
    }

    /// Patch that replaces the profile customization.
    pub fn customization(customization: Customization) -> Self {
        Self {
            customization: Some(customization),
            ..Self::default()
        }
    }

    /// Apply this patch onto a record, bumping `updated_at`.
    pub fn apply(self, record: &mut UserRecord) {
        if let Some(username) = self.username {
            record.username = username;
        }
        if let Some(username_lower) = self.username_lower {
            record.username_lower = username_lower;
        }
        if let Some(display_name) = self.display_name {
            record.display_name = Some(display_name);
        }
        if let Some(email) = self.email {
            record.email = Some(email);
        }
        if let Some(address) = self.address {
            record.address = Some(address);
        }
        if let Some(customization) = self.customization {
            record.customization = Some(customization);
        }
        record.updated_at = Utc::now();
    }
}
