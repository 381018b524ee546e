//! Common test utilities
//!
//! Builds a full application around the in-memory store and a fake
//! courier so integration tests run without external services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;

use postbox::delivery::{DeliveryOutcome, LetterCourier};
use postbox::mail::model::Provider;
use postbox::server::config::ServerConfig;
use postbox::server::create_app_with_state;
use postbox::server::state::AppState;
use postbox::store::MemoryStore;
use postbox::users::model::PostalAddress;

/// Courier that counts delivery attempts and answers with a fixed
/// outcome. Defaults to success.
pub struct FakeCourier {
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl FakeCourier {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LetterCourier for FakeCourier {
    fn supports(&self, _provider: Provider) -> bool {
        true
    }

    async fn deliver(
        &self,
        _provider: Provider,
        _to: &PostalAddress,
        _from: &PostalAddress,
        _html: &str,
    ) -> DeliveryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(reason) => DeliveryOutcome::failed(reason.clone()),
            None => DeliveryOutcome::sent("ltr_test"),
        }
    }
}

/// Everything a test needs: the server plus handles to the store and
/// courier behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub courier: Arc<FakeCourier>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_courier(FakeCourier::succeeding())
}

pub fn spawn_app_with_courier(courier: FakeCourier) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let courier = Arc::new(courier);
    let state = AppState::new(store.clone(), courier.clone(), ServerConfig::for_tests());
    let server = TestServer::new(create_app_with_state(state)).unwrap();
    TestApp {
        server,
        store,
        courier,
    }
}

impl TestApp {
    /// Dev-login as a username and return the bearer token.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/auth/dev-login")
            .json(&serde_json::json!({ "username": username }))
            .await;
        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("dev-login should return a token")
            .to_string()
    }
}
