//! Delivery Module
//!
//! External delivery collaborator: converts a rendered letter into a
//! physically mailed artifact through a third-party provider. The
//! `LetterCourier` trait is the seam; `HttpCourier` is the real
//! implementation, tests plug in fakes.
//!
//! Delivery never fails the process: any provider or transport error
//! becomes a `Failed` outcome with the error text as the diagnostic
//! reference. Retry policy, if any, belongs to the provider side.

use async_trait::async_trait;

use crate::mail::model::Provider;
use crate::users::model::PostalAddress;

pub mod http;

pub use http::HttpCourier;

/// Terminal delivery result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Outcome of one delivery attempt: status plus an opaque provider
/// reference on success, or the diagnostic text on failure.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub status: DeliveryStatus,
    pub reference: Option<String>,
}

impl DeliveryOutcome {
    pub fn sent(reference: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Sent,
            reference: Some(reference.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            reference: Some(reason.into()),
        }
    }
}

/// Delivery collaborator interface. Only external providers
/// (`LOB`, `POSTGRID`) reach this; `NONE` and `MANUAL` are handled
/// in-core without any courier call.
#[async_trait]
pub trait LetterCourier: Send + Sync {
    /// Whether this courier is configured for the given provider.
    /// Unconfigured providers are rejected before any record is
    /// created.
    fn supports(&self, provider: Provider) -> bool;

    /// Attempt delivery of a rendered letter.
    async fn deliver(
        &self,
        provider: Provider,
        to: &PostalAddress,
        from: &PostalAddress,
        html: &str,
    ) -> DeliveryOutcome;
}
