//! # Stripe Webhook Handling
//!
//! Signature verification for the `Stripe-Signature` header and parsing of
//! the event envelope into a [`WebhookEvent`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shop_core::{
    SessionPaymentStatus, ShopError, ShopResult, WebhookEvent, WebhookEventType,
    ORDER_ID_METADATA_KEY,
};
use tracing::debug;

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Events to enable on the Stripe webhook endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.expired",
];

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> ShopResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        ShopError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(ShopError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

pub(crate) fn compute_hmac_sha256(secret: &str, message: &[u8]) -> ShopResult<String> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ShopError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Equality that does not short-circuit on the first differing byte
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check a `Stripe-Signature` header against the raw body.
///
/// The signed message is `"{t}.{payload}"`; `now` is unix seconds.
pub fn verify_signature(secret: &str, payload: &[u8], header: &str, now: i64) -> ShopResult<()> {
    let parts = parse_signature_header(header)?;

    if now.abs_diff(parts.timestamp) > SIGNATURE_TOLERANCE_SECS as u64 {
        return Err(ShopError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let mut signed = format!("{}.", parts.timestamp).into_bytes();
    signed.extend_from_slice(payload);
    let expected = compute_hmac_sha256(secret, &signed)?;

    if !parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected))
    {
        return Err(ShopError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }
    Ok(())
}

/// Build a header value the way Stripe signs (used by tests and tooling)
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> ShopResult<String> {
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);
    Ok(format!("t={},v1={}", timestamp, compute_hmac_sha256(secret, &signed)?))
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

fn event_type(name: &str) -> WebhookEventType {
    match name {
        "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
        "checkout.session.expired" => WebhookEventType::CheckoutExpired,
        "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
        "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
        "charge.refunded" => WebhookEventType::RefundIssued,
        other => WebhookEventType::Unknown(other.to_string()),
    }
}

pub(crate) fn payment_status(value: Option<&str>) -> SessionPaymentStatus {
    match value {
        Some("paid") => SessionPaymentStatus::Paid,
        Some("no_payment_required") => SessionPaymentStatus::NoPaymentRequired,
        _ => SessionPaymentStatus::Unpaid,
    }
}

/// Parse a verified payload into a [`WebhookEvent`]
pub fn parse_event(payload: &[u8]) -> ShopResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| ShopError::WebhookParseError(format!("Failed to parse webhook: {}", e)))?;

    debug!(event_id = %event.id, event_type = %event.event_type, "Parsed Stripe webhook");

    let object = &event.data.object;
    let str_field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(String::from);

    // session ids only make sense on checkout.session.* objects
    let is_session = object.get("object").and_then(|v| v.as_str()) == Some("checkout.session");

    Ok(WebhookEvent {
        event_type: event_type(&event.event_type),
        provider: "stripe".to_string(),
        session_id: if is_session { str_field("id") } else { None },
        payment_intent_id: str_field("payment_intent"),
        order_id: object
            .get("metadata")
            .and_then(|m| m.get(ORDER_ID_METADATA_KEY))
            .and_then(|v| v.as_str())
            .map(String::from),
        payment_status: payment_status(object.get("payment_status").and_then(|v| v.as_str())),
        customer_email: object
            .get("customer_details")
            .and_then(|cd| cd.get("email"))
            .and_then(|v| v.as_str())
            .map(String::from),
        amount_paid: object.get("amount_total").and_then(|v| v.as_i64()),
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        raw_data: Some(serde_json::Value::Object(event.data.object)),
        event_id: event.id,
    })
}

/// Print instructions for setting up webhooks
pub fn print_webhook_setup_instructions(endpoint_url: &str) {
    println!("=== Stripe Webhook Setup ===\n");
    println!("1. Go to: https://dashboard.stripe.com/webhooks\n");
    println!("2. Click 'Add endpoint'\n");
    println!("3. Enter endpoint URL: {}\n", endpoint_url);
    println!("4. Select these events:");
    for event in REQUIRED_WEBHOOK_EVENTS {
        println!("   - {}", event);
    }
    println!("\n5. Copy the signing secret (whsec_...) to your .env file");
    println!("\n6. For local testing, use Stripe CLI:");
    println!("   stripe listen --forward-to {}", endpoint_url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    fn completed_payload() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_123",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "object": "checkout.session",
                    "payment_intent": "pi_test_456",
                    "customer_details": { "email": "ada@example.com" },
                    "amount_total": 501_500,
                    "currency": "ngn",
                    "payment_status": "paid",
                    "metadata": { "order_id": "ord_abc" }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_signature_header() {
        let parsed = parse_signature_header("t=1234567890,v1=abc123,v0=zzz,v1=def456").unwrap();
        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);

        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
    }

    #[test]
    fn test_verify_signature() {
        let payload = completed_payload();
        let now = 1_700_000_100;
        let header = sign_payload(SECRET, &payload, now).unwrap();

        assert!(verify_signature(SECRET, &payload, &header, now).is_ok());
        assert!(verify_signature(SECRET, &payload, &header, now + 299).is_ok());

        let err = verify_signature("whsec_other", &payload, &header, now).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Webhook verification failed: Signature mismatch"
        );

        let mut tampered = payload.clone();
        tampered.push(b' ');
        assert!(verify_signature(SECRET, &tampered, &header, now).is_err());
    }

    #[test]
    fn test_stale_signature_rejected() {
        let payload = completed_payload();
        let header = sign_payload(SECRET, &payload, 1_700_000_000).unwrap();
        let err = verify_signature(SECRET, &payload, &header, 1_700_000_301).unwrap_err();
        assert!(err.to_string().contains("tolerance"));

        let err = verify_signature(SECRET, &payload, "t=-9223372036854775808,v1=00", 1_700_000_000)
            .unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_parse_checkout_completed() {
        let event = parse_event(&completed_payload()).unwrap();

        assert_eq!(event.event_id, "evt_123");
        assert_eq!(event.event_type, WebhookEventType::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
        assert_eq!(event.order_id.as_deref(), Some("ord_abc"));
        assert_eq!(event.payment_status, SessionPaymentStatus::Paid);
        assert_eq!(event.customer_email.as_deref(), Some("ada@example.com"));
        assert_eq!(event.amount_paid, Some(501_500));
    }

    #[test]
    fn test_parse_other_events() {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_9",
            "type": "customer.created",
            "created": 1_700_000_000,
            "data": { "object": { "id": "cus_1", "object": "customer" } }
        }))
        .unwrap();
        let event = parse_event(&payload).unwrap();
        assert_eq!(
            event.event_type,
            WebhookEventType::Unknown("customer.created".to_string())
        );
        assert!(event.session_id.is_none());

        assert!(matches!(
            parse_event(b"not json"),
            Err(ShopError::WebhookParseError(_))
        ));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
