/**
 * HTTP Courier
 *
 * Real provider integrations over authenticated HTTPS:
 * - Lob: form-encoded POST with basic auth (key as username)
 * - PostGrid: JSON POST with an `x-api-key` header
 *
 * Provider calls cross an untrusted network boundary, so the client
 * carries an explicit timeout rather than blocking request handling
 * indefinitely.
 */

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::delivery::{DeliveryOutcome, LetterCourier};
use crate::mail::model::Provider;
use crate::users::model::PostalAddress;

const LOB_URL: &str = "https://api.lob.com/v1/letters";
const POSTGRID_URL: &str = "https://api.postgrid.com/print-mail/v1/letters";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Courier holding provider credentials and a shared HTTP client.
pub struct HttpCourier {
    client: Client,
    lob_key: Option<String>,
    postgrid_key: Option<String>,
}

impl HttpCourier {
    pub fn new(
        lob_key: Option<String>,
        postgrid_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(PROVIDER_TIMEOUT).build()?;
        Ok(Self {
            client,
            lob_key,
            postgrid_key,
        })
    }

    async fn send_via_lob(
        &self,
        to: &PostalAddress,
        from: &PostalAddress,
        html: &str,
    ) -> Result<String, String> {
        let key = self.lob_key.as_deref().ok_or("LOB_KEY missing")?;

        let form = [
            ("to[name]", to.name.as_str()),
            ("to[address_line1]", to.line1.as_str()),
            ("to[address_city]", to.city.as_str()),
            ("to[address_state]", to.region.as_str()),
            ("to[address_zip]", to.postal.as_str()),
            ("to[address_country]", to.country.as_str()),
            ("from[name]", from.name.as_str()),
            ("from[address_line1]", from.line1.as_str()),
            ("from[address_city]", from.city.as_str()),
            ("from[address_state]", from.region.as_str()),
            ("from[address_zip]", from.postal.as_str()),
            ("from[address_country]", from.country.as_str()),
            ("file", html),
            ("color", "false"),
        ];

        let response = self
            .client
            .post(LOB_URL)
            .basic_auth(key, Some(""))
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("Lob request failed: {e}"))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Lob error {status}: {text}"));
        }

        extract_id(response).await.map_err(|e| format!("Lob: {e}"))
    }

    async fn send_via_postgrid(
        &self,
        to: &PostalAddress,
        from: &PostalAddress,
        html: &str,
    ) -> Result<String, String> {
        let key = self.postgrid_key.as_deref().ok_or("POSTGRID_KEY missing")?;

        let response = self
            .client
            .post(POSTGRID_URL)
            .header("x-api-key", key)
            .json(&serde_json::json!({
                "to": to,
                "from": from,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| format!("PostGrid request failed: {e}"))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("PostGrid error {status}: {text}"));
        }

        extract_id(response)
            .await
            .map_err(|e| format!("PostGrid: {e}"))
    }
}

async fn extract_id(response: reqwest::Response) -> Result<String, String> {
    let value: serde_json::Value = response
        .json()
        .await
        .map_err(|e| format!("invalid response body: {e}"))?;
    value
        .get("id")
        .and_then(|id| id.as_str())
        .map(str::to_string)
        .ok_or_else(|| "response missing letter id".to_string())
}

#[async_trait]
impl LetterCourier for HttpCourier {
    fn supports(&self, provider: Provider) -> bool {
        match provider {
            Provider::Lob => self.lob_key.is_some(),
            Provider::Postgrid => self.postgrid_key.is_some(),
            Provider::None | Provider::Manual => true,
        }
    }

    async fn deliver(
        &self,
        provider: Provider,
        to: &PostalAddress,
        from: &PostalAddress,
        html: &str,
    ) -> DeliveryOutcome {
        let result = match provider {
            Provider::Lob => self.send_via_lob(to, from, html).await,
            Provider::Postgrid => self.send_via_postgrid(to, from, html).await,
            Provider::None | Provider::Manual => Err("unsupported-provider".to_string()),
        };

        match result {
            Ok(reference) => {
                tracing::info!(provider = provider.as_str(), %reference, "letter delivered");
                DeliveryOutcome::sent(reference)
            }
            Err(reason) => {
                tracing::warn!(provider = provider.as_str(), %reason, "delivery failed");
                DeliveryOutcome::failed(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_reflects_configured_keys() {
        let courier = HttpCourier::new(Some("lob-key".to_string()), None).unwrap();
        assert!(courier.supports(Provider::Lob));
        assert!(!courier.supports(Provider::Postgrid));
        assert!(courier.supports(Provider::Manual));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let courier = HttpCourier::new(None, None).unwrap();
        let address = PostalAddress {
            name: "Cole".to_string(),
            line1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            region: "IL".to_string(),
            postal: "62701".to_string(),
            country: "US".to_string(),
        };

        let outcome = courier
            .deliver(Provider::Lob, &address, &address, "<html></html>")
            .await;
        assert_eq!(outcome.status, crate::delivery::DeliveryStatus::Failed);
        assert!(outcome.reference.unwrap().contains("LOB_KEY missing"));
    }
}
