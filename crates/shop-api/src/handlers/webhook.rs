use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shop_core::{ShopError, WebhookOutcome};
use tracing::{info, instrument, warn};

/// Handle Stripe webhook
///
/// The raw body is needed for signature verification, so this route takes
/// `Bytes` rather than JSON. Errors make Stripe retry; duplicates and
/// ignored events are acknowledged.
#[instrument(skip(state, headers, body))]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ShopError::WebhookVerificationFailed("Missing Stripe-Signature header".to_string())
        })?;

    let strategy = state.payments.as_ref().ok_or_else(|| {
        ShopError::Configuration("Stripe not configured".to_string())
    })?;

    let event = strategy.verify_webhook(&body, signature).await.map_err(|e| {
        warn!(error = %e, "Webhook verification failed");
        e
    })?;

    info!(
        event_id = %event.event_id,
        event_type = ?event.event_type,
        "Received webhook"
    );

    let outcome = state.orders.handle_webhook_event(event).await?;
    let outcome = match outcome {
        WebhookOutcome::Processed => "processed",
        WebhookOutcome::Duplicate => "duplicate",
        WebhookOutcome::Ignored => "ignored",
    };
    Ok(Json(json!({ "received": true, "outcome": outcome })))
}
