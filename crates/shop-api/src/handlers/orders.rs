//! # Order Handlers
//!
//! Thin adapters over [`OrderService`](shop_core::OrderService): placing
//! orders, hosted checkout, payment verification after the redirect,
//! manual bank-transfer confirmation and cancellation.

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{NewOrder, ShopError};
use tracing::{info, instrument};

/// Body of `POST /api/order/verify-payment`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub order_id: String,
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let order = state.orders.place_order(auth.id(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": order })),
    ))
}

/// Create an Online Payment order and return the hosted checkout URL
#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let (order, session) = state.orders.start_checkout(auth.id(), input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "orderId": order.id,
            "sessionId": session.session_id,
            "url": session.checkout_url,
            "expiresAt": session.expires_at.map(|t| t.to_rfc3339()),
        })),
    ))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn verify_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    if request.session_id.trim().is_empty() || request.order_id.trim().is_empty() {
        return Err(ShopError::validation("sessionId and orderId are required").into());
    }

    let order = state
        .orders
        .confirm_payment(
            &auth.requester(),
            request.session_id.trim(),
            request.order_id.trim(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Payment verified",
        "order": order,
    })))
}

pub async fn user_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.orders_for_user(auth.id()).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.all_orders().await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.get_order(&id, &auth.requester()).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}

#[instrument(skip(state, admin))]
pub async fn mark_paid(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.mark_paid(&id, admin.id()).await?;
    info!(order_id = %order.id, "Bank transfer confirmed");
    Ok(Json(json!({
        "success": true,
        "message": "Order marked as paid",
        "order": order,
    })))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.cancel(&id, &auth.requester()).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order cancelled",
        "order": order,
    })))
}
