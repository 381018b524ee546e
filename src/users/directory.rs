/**
 * Username Directory
 *
 * Case-insensitive unique mapping from handle to user record. Display
 * case lives in `username`, the lookup key in `username_lower`; the
 * split exists because the backing store only supports exact-match
 * queries.
 *
 * Uniqueness is enforced at claim time with a check-then-write, so two
 * concurrent claims of the same handle can race past the check. The
 * store's per-document atomicity bounds the damage to last-write-wins
 * on a single record.
 */

use crate::error::ApiError;
use crate::store::{Store, StoreError};
use crate::users::model::{UserPatch, UserRecord};

/// Normalize a human-entered handle into the lookup key: trim
/// whitespace, strip a single leading `@`, lowercase.
pub fn normalize(raw: &str) -> String {
    display_form(raw).to_lowercase()
}

/// Trim and strip a single leading `@`, preserving display case.
pub fn display_form(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}

/// Resolve a handle to its user record.
///
/// The normalized index is authoritative; records created before the
/// index existed are found by an exact-case fallback on `username`.
pub async fn find_by_username(
    store: &dyn Store,
    handle: &str,
) -> Result<UserRecord, ApiError> {
    let lower = normalize(handle);
    if lower.is_empty() {
        return Err(ApiError::invalid_argument("username is required"));
    }

    if let Some(record) = store.find_user_by_username_lower(&lower).await? {
        return Ok(record);
    }

    // Legacy records may have a display username without the
    // normalized index entry.
    if let Some(record) = store.find_user_by_username_exact(display_form(handle)).await? {
        return Ok(record);
    }

    Err(ApiError::not_found(format!("Handle not found: {lower}")))
}

/// Claim `desired` for `id`, upserting both username forms.
///
/// Fails with `Conflict` when the normalized form already belongs to a
/// different identity. Re-claiming one's own name is idempotent.
pub async fn claim_username(
    store: &dyn Store,
    id: &str,
    desired: &str,
) -> Result<(String, String), ApiError> {
    let username = display_form(desired).to_string();
    let username_lower = username.to_lowercase();
    if username_lower.is_empty() {
        return Err(ApiError::invalid_argument("username is required"));
    }

    if let Some(existing) = store.find_user_by_username_lower(&username_lower).await? {
        if existing.id != id {
            tracing::debug!(username = %username_lower, "username already taken");
            return Err(ApiError::conflict("Username already taken"));
        }
    }

    store
        .merge_user(id, UserPatch::username(username.clone(), username_lower.clone()))
        .await?;

    Ok((username, username_lower))
}

/// True if either the normalized or the exact-case lookup matches.
/// Absence is a normal answer, not an error.
pub async fn exists(store: &dyn Store, handle: &str) -> Result<bool, StoreError> {
    let lower = normalize(handle);
    if lower.is_empty() {
        return Ok(false);
    }
    if store.find_user_by_username_lower(&lower).await?.is_some() {
        return Ok(true);
    }
    Ok(store
        .find_user_by_username_exact(display_form(handle))
        .await?
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  @Cole  "), "cole");
        assert_eq!(normalize("@JACK"), "jack");
        assert_eq!(normalize("jack"), "jack");
        assert_eq!(normalize("@"), "");
        // only a single leading @ is stripped
        assert_eq!(normalize("@@cole"), "@cole");
    }

    #[tokio::test]
    async fn test_claim_and_case_insensitive_roundtrip() {
        let store = MemoryStore::new();
        let (username, lower) = claim_username(&store, "u1", "Jack").await.unwrap();
        assert_eq!(username, "Jack");
        assert_eq!(lower, "jack");

        for handle in ["Jack", "jack", "@JACK"] {
            let record = find_by_username(&store, handle).await.unwrap();
            assert_eq!(record.id, "u1");
            assert_eq!(record.username, "Jack");
        }
    }

    #[tokio::test]
    async fn test_claim_conflict() {
        let store = MemoryStore::new();
        claim_username(&store, "u1", "cole").await.unwrap();

        let err = claim_username(&store, "u2", "@Cole").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reclaim_own_name_is_idempotent() {
        let store = MemoryStore::new();
        claim_username(&store, "u1", "Cole").await.unwrap();
        let (username, lower) = claim_username(&store, "u1", "Cole").await.unwrap();
        assert_eq!((username.as_str(), lower.as_str()), ("Cole", "cole"));
    }

    #[tokio::test]
    async fn test_exact_case_fallback_for_legacy_records() {
        let store = MemoryStore::new();
        // legacy record: display username persisted without the
        // normalized index entry
        let mut patch = UserPatch::default();
        patch.username = Some("OldTimer".to_string());
        store.merge_user("u9", patch).await.unwrap();

        let record = find_by_username(&store, "OldTimer").await.unwrap();
        assert_eq!(record.id, "u9");
        // the lowercase form never got indexed, so a different case
        // cannot find the legacy record
        assert!(find_by_username(&store, "oldtimer").await.is_err());
    }

    #[tokio::test]
    async fn test_exists_does_not_fail_on_absence() {
        let store = MemoryStore::new();
        assert!(!exists(&store, "ghost").await.unwrap());
        assert!(!exists(&store, "  ").await.unwrap());

        claim_username(&store, "u1", "Cole").await.unwrap();
        assert!(exists(&store, "@cole").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_claim_rejected() {
        let store = MemoryStore::new();
        let err = claim_username(&store, "u1", "  @ ").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
