//! Shopping cart. Totals are recomputed from current product prices on
//! every write and read.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shop_core::{Cart, CartLine, CartRepository, ProductRepository, ShopResult};
use std::collections::HashMap;
use tracing::{debug, instrument};

async fn load_cart(state: &AppState, user_id: &str) -> ShopResult<Cart> {
    Ok(state
        .store
        .find_cart(user_id)
        .await?
        .unwrap_or_else(|| Cart::new(user_id)))
}

/// Reprice against the live catalog and persist
async fn save_repriced(state: &AppState, mut cart: Cart) -> ShopResult<Cart> {
    let prices: HashMap<String, i64> = state
        .store
        .list_products()
        .await?
        .into_iter()
        .map(|p| (p.id, p.product_price))
        .collect();

    let dropped = cart.reprice(|id| prices.get(id).copied());
    if dropped > 0 {
        debug!(user_id = %cart.user_id, dropped, "Dropped cart lines for deleted products");
    }
    state.store.save_cart(cart).await
}

pub async fn get(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let cart = load_cart(&state, auth.id()).await?;
    let cart = save_repriced(&state, cart).await?;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CartLine>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(line) = payload?;
    line.require_quantity()?;

    let product = state.store.get_product(line.product_id.trim()).await?;
    let mut cart = load_cart(&state, auth.id()).await?;
    cart.add(&product, &line)?;
    let cart = save_repriced(&state, cart).await?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CartLine>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(line) = payload?;
    line.require_quantity()?;

    let product = state.store.get_product(line.product_id.trim()).await?;
    let mut cart = load_cart(&state, auth.id()).await?;
    cart.update(&product, &line)?;
    let cart = save_repriced(&state, cart).await?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CartLine>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(line) = payload?;
    let mut cart = load_cart(&state, auth.id()).await?;
    cart.remove(&line)?;
    let cart = save_repriced(&state, cart).await?;

    Ok(Json(json!({ "success": true, "cart": cart })))
}

pub async fn clear(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let mut cart = load_cart(&state, auth.id()).await?;
    cart.clear();
    let cart = state.store.save_cart(cart).await?;
    Ok(Json(json!({ "success": true, "message": "Cart cleared", "cart": cart })))
}
