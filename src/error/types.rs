/**
 * API Error Types
 *
 * This module defines the error taxonomy used by every handler in the
 * backend. Each variant maps to exactly one HTTP status code, so a
 * handler can bubble errors with `?` and the conversion layer takes
 * care of the response.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// All errors a request can surface to a caller.
///
/// Variants carry the user-facing message. Store and internal failures
/// are logged at the conversion boundary and replaced with a generic
/// message so internals never leak into responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or unverifiable bearer credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Request violated a stated constraint (empty body, missing field).
    #[error("{0}")]
    InvalidArgument(String),

    /// Caller is authenticated but not authorized for this record.
    #[error("{0}")]
    Forbidden(String),

    /// Unknown recipient, mail id, or username.
    #[error("{0}")]
    NotFound(String),

    /// Username already claimed by another identity.
    #[error("{0}")]
    Conflict(String),

    /// The delivery provider reported a failure. The mail record is
    /// persisted with `FAILED` status before this is raised.
    #[error("Provider {provider} failed: {reason}")]
    DeliveryFailed { provider: String, reason: String },

    /// Username provisioning ran out of disambiguation candidates.
    #[error("{0}")]
    ResourceExhausted(String),

    /// Backing store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else unexpected.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::ResourceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message to include in the response body.
    ///
    /// Store and internal errors return a fixed message; their detail
    /// only goes to the logs.
    pub fn message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
