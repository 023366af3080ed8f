//! # Payment Strategy Trait
//!
//! Seam between the order lifecycle and a hosted-checkout provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()                                      │
//! │  ├── retrieve_session()                                     │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │StripeCheckout │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```

use crate::error::ShopResult;
use crate::order::Order;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata key carrying our order id on provider sessions
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

/// Status of a checkout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Created, awaiting payment
    #[default]
    Open,
    /// Customer finished the flow
    Complete,
    /// Session expired
    Expired,
}

/// Whether money has actually moved for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    Paid,
    #[default]
    Unpaid,
    NoPaymentRequired,
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Our order ID, from session metadata
    pub order_id: Option<String>,

    pub provider: String,

    /// Hosted payment page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,

    #[serde(default)]
    pub status: CheckoutStatus,

    #[serde(default)]
    pub payment_status: SessionPaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            order_id: None,
            provider: provider.into(),
            checkout_url: None,
            status: CheckoutStatus::Open,
            payment_status: SessionPaymentStatus::Unpaid,
            expires_at: None,
            payment_intent_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == SessionPaymentStatus::Paid
    }
}

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    CheckoutCompleted,
    CheckoutExpired,
    PaymentSucceeded,
    PaymentFailed,
    RefundIssued,
    /// Passthrough for anything else
    Unknown(String),
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Provider event ID; used for de-duplication
    pub event_id: String,

    pub event_type: WebhookEventType,

    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default)]
    pub payment_status: SessionPaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Smallest currency unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}

/// Payment provider implementation.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session for an order.
    ///
    /// The session must carry the order id in its metadata so later
    /// webhooks and verifications can find the order.
    async fn create_checkout(
        &self,
        order: &Order,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession>;

    /// Fetch a session's current state from the provider
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent>;

    /// Provider name, for logging
    fn provider_name(&self) -> &'static str;
}

pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Storefront URLs the provider redirects back to
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub base_url: String,
    pub success_path: String,
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            success_path: "/checkout/success".to_string(),
            cancel_path: "/checkout/cancel".to_string(),
        }
    }

    /// Success URL; the provider substitutes `{CHECKOUT_SESSION_ID}`
    pub fn success_url(&self, order_id: &str) -> String {
        format!(
            "{}{}?session_id={{CHECKOUT_SESSION_ID}}&order_id={}",
            self.base_url, self.success_path, order_id
        )
    }

    pub fn cancel_url(&self, order_id: &str) -> String {
        format!("{}{}?order_id={}", self.base_url, self.cancel_path, order_id)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:5173")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://shop.example.com/");

        assert_eq!(
            urls.success_url("o1"),
            "https://shop.example.com/checkout/success?session_id={CHECKOUT_SESSION_ID}&order_id=o1"
        );
        assert_eq!(
            urls.cancel_url("o1"),
            "https://shop.example.com/checkout/cancel?order_id=o1"
        );
    }

    #[test]
    fn test_session_paid() {
        let mut session = CheckoutSession::new("cs_1", "stripe");
        assert!(!session.is_paid());
        session.payment_status = SessionPaymentStatus::Paid;
        assert!(session.is_paid());
    }
}
