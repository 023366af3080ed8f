//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API: hosted payment
//! pages for online-payment orders.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shop_core::{
    CheckoutSession, CheckoutStatus, Order, PaymentStrategy, ShopError, ShopResult,
    WebhookEvent, ORDER_ID_METADATA_KEY,
};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page; card data never touches the shop.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn from_env() -> ShopResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form fields for a new session: one line per item plus delivery
    fn session_form(order: &Order, success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
        let currency = order.currency.as_str();
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            ("customer_email".to_string(), order.address.email.clone()),
            ("client_reference_id".to_string(), order.id.clone()),
        ];

        let mut push_line = |i: usize, name: String, unit_amount: i64, quantity: u32| {
            form.push((format!("line_items[{}][price_data][currency]", i), currency.to_string()));
            form.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                unit_amount.to_string(),
            ));
            form.push((format!("line_items[{}][price_data][product_data][name]", i), name));
            form.push((format!("line_items[{}][quantity]", i), quantity.to_string()));
        };

        for (i, item) in order.items.iter().enumerate() {
            let name = match (item.size, item.color) {
                (Some(size), Some(color)) => format!("{} ({}, {})", item.name, size, color),
                (Some(size), None) => format!("{} ({})", item.name, size),
                (None, Some(color)) => format!("{} ({})", item.name, color),
                (None, None) => item.name.clone(),
            };
            push_line(i, name, item.price, item.quantity);
        }
        if order.delivery_fee > 0 {
            push_line(order.items.len(), "Delivery fee".to_string(), order.delivery_fee, 1);
        }

        form.push((
            format!("metadata[{}]", ORDER_ID_METADATA_KEY),
            order.id.clone(),
        ));
        form.push(("metadata[user_id]".to_string(), order.user_id.clone()));
        form
    }

    /// Send a request and decode the JSON body, mapping Stripe errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ShopResult<T> {
        let response = request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            error!(%status, body = %body, "Stripe API error");
            let message = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => format!("HTTP {}: {}", status, body),
            };
            return Err(ShopError::Provider {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, order, success_url, cancel_url), fields(order_id = %order.id))]
    async fn create_checkout(
        &self,
        order: &Order,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession> {
        if order.items.is_empty() {
            return Err(ShopError::validation("Order has no items"));
        }

        let form = Self::session_form(order, success_url, cancel_url);
        debug!(items = order.items.len(), "Creating Stripe checkout session");

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let request = self
            .client
            .post(&url)
            .header("Idempotency-Key", format!("checkout-{}", order.id))
            .form(&form);
        let response: StripeSessionResponse = self.send(request).await?;

        info!(session_id = %response.id, "Created Stripe checkout session");
        Ok(response.into_session())
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<CheckoutSession> {
        if session_id.is_empty()
            || !session_id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(ShopError::validation("Invalid session id"));
        }
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );
        let response: StripeSessionResponse = self.send(self.client.get(&url)).await?;
        debug!(
            session_id = %response.id,
            payment_status = ?response.payment_status,
            "Retrieved Stripe checkout session"
        );
        Ok(response.into_session())
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent> {
        webhook::verify_signature(
            &self.config.webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
        )?;
        webhook::parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl StripeSessionResponse {
    fn into_session(self) -> CheckoutSession {
        let mut session = CheckoutSession::new(self.id, PROVIDER);
        session.order_id = self.metadata.get(ORDER_ID_METADATA_KEY).cloned();
        session.checkout_url = self.url;
        session.status = match self.status.as_deref() {
            Some("complete") => CheckoutStatus::Complete,
            Some("expired") => CheckoutStatus::Expired,
            _ => CheckoutStatus::Open,
        };
        session.payment_status = webhook::payment_status(self.payment_status.as_deref());
        session.payment_intent_id = self.payment_intent;
        session.expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));
        session.metadata = self.metadata;
        session
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_core::{
        AddressDetails, Currency, LineItem, NewOrder, PaymentType, SessionPaymentStatus, Size,
        Color, StockRequest,
    };
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn order() -> Order {
        let input = NewOrder {
            items: vec![StockRequest {
                product_id: "p1".into(),
                quantity: 2,
                size: Some(Size::M),
                color: Some(Color::Black),
            }],
            address: AddressDetails {
                fullname: "Ada Obi".into(),
                company: None,
                country: "Nigeria".into(),
                city: "Lagos".into(),
                state: "Lagos".into(),
                phone: "+2348000000000".into(),
                email: "ada@example.com".into(),
            },
            payment_type: PaymentType::OnlinePayment,
            subtotal: 500_000,
            delivery_fee: 1_500,
            total: 501_500,
        };
        let items = vec![LineItem {
            product: "p1".into(),
            name: "Classic Boxer".into(),
            price: 250_000,
            quantity: 2,
            size: Some(Size::M),
            color: Some(Color::Black),
        }];
        Order::new("u1", input, items, Currency::NGN, false).unwrap()
    }

    fn strategy(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc", "whsec_test").with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    #[test]
    fn test_session_form() {
        let order = order();
        let form = StripeCheckoutStrategy::session_form(&order, "https://s", "https://c");
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("ngn"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("250000"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Classic Boxer (M, Black)")
        );
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("1500"));
        assert_eq!(get("line_items[1][quantity]"), Some("1"));
        assert_eq!(get("metadata[order_id]"), Some(order.id.as_str()));
    }

    #[tokio::test]
    async fn test_create_checkout() {
        let server = MockServer::start().await;
        let order = order();

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(header("Idempotency-Key", format!("checkout-{}", order.id).as_str()))
            .and(body_string_contains("metadata%5Border_id%5D"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "status": "open",
                "payment_status": "unpaid",
                "expires_at": 1_900_000_000,
                "metadata": { "order_id": order.id.clone() }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = strategy(&server)
            .create_checkout(&order, "https://s", "https://c")
            .await
            .unwrap();
        assert_eq!(session.session_id, "cs_test_1");
        assert_eq!(session.order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(session.status, CheckoutStatus::Open);
        assert!(!session.is_paid());
        assert!(session.checkout_url.is_some());
    }

    #[tokio::test]
    async fn test_provider_error_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid currency: xyz", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&order(), "https://s", "https://c")
            .await
            .unwrap_err();
        match err {
            ShopError::Provider { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid currency: xyz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": null,
                "status": "complete",
                "payment_status": "paid",
                "payment_intent": "pi_1",
                "metadata": { "order_id": "ord_1" }
            })))
            .mount(&server)
            .await;

        let session = strategy(&server).retrieve_session("cs_test_1").await.unwrap();
        assert_eq!(session.status, CheckoutStatus::Complete);
        assert_eq!(session.payment_status, SessionPaymentStatus::Paid);
        assert_eq!(session.order_id.as_deref(), Some("ord_1"));
        assert_eq!(session.payment_intent_id.as_deref(), Some("pi_1"));
    }

    #[tokio::test]
    async fn test_retrieve_session_rejects_unsafe_ids() {
        let server = MockServer::start().await;
        let strategy = strategy(&server);

        for id in ["", "cs_1/../x", "cs_1?expand=x", "cs_1#frag", "cs 1"] {
            let err = strategy.retrieve_session(id).await.unwrap_err();
            assert!(matches!(err, ShopError::Validation(_)), "{id}: {err:?}");
        }
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_verify_webhook_roundtrip() {
        let server = MockServer::start().await;
        let strategy = strategy(&server);
        let payload = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.expired",
            "created": 1_700_000_000,
            "data": { "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "payment_status": "unpaid",
                "metadata": { "order_id": "ord_1" }
            } }
        }))
        .unwrap();

        let header = webhook::sign_payload("whsec_test", &payload, Utc::now().timestamp()).unwrap();
        let event = strategy.verify_webhook(&payload, &header).await.unwrap();
        assert_eq!(event.event_type, shop_core::WebhookEventType::CheckoutExpired);
        assert_eq!(event.order_id.as_deref(), Some("ord_1"));

        assert!(strategy.verify_webhook(&payload, "t=1,v1=00").await.is_err());
    }
}
