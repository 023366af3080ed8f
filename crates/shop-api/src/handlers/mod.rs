//! # Request Handlers
//!
//! One module per resource. Every success body carries `"success": true`;
//! failures go through [`ApiError`](crate::error::ApiError).

pub mod addresses;
pub mod admin;
pub mod blogs;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
pub mod webhook;
pub mod wishlist;

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "byc-shop",
        "version": env!("CARGO_PKG_VERSION"),
        "onlinePayments": state.orders.online_payments_enabled(),
    }))
}
