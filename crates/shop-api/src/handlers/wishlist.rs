//! Wishlist. Responses list the full product documents, skipping products
//! that have since been deleted.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{
    Product, ProductRepository, ShopError, ShopResult, Wishlist, WishlistRepository,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    #[serde(default)]
    pub product_id: String,
}

impl WishlistRequest {
    fn product_id(&self) -> ShopResult<&str> {
        match self.product_id.trim() {
            "" => Err(ShopError::validation("Product ID is required")),
            id => Ok(id),
        }
    }
}

async fn populate(state: &AppState, wishlist: &Wishlist) -> ShopResult<Vec<Product>> {
    let mut products = Vec::with_capacity(wishlist.items.len());
    for id in &wishlist.items {
        match state.store.get_product(id).await {
            Ok(product) => products.push(product),
            Err(ShopError::NotFound { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(products)
}

async fn load(state: &AppState, user_id: &str) -> ShopResult<Wishlist> {
    Ok(state
        .store
        .find_wishlist(user_id)
        .await?
        .unwrap_or_else(|| Wishlist::new(user_id)))
}

pub async fn get(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let wishlist = load(&state, auth.id()).await?;
    let items = populate(&state, &wishlist).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let product = state.store.get_product(request.product_id()?).await?;

    let mut wishlist = load(&state, auth.id()).await?;
    if wishlist.add(&product.id) {
        wishlist = state.store.save_wishlist(wishlist).await?;
    }
    let items = populate(&state, &wishlist).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let product_id = request.product_id()?;

    let mut wishlist = load(&state, auth.id()).await?;
    wishlist.remove(product_id);
    let wishlist = state.store.save_wishlist(wishlist).await?;
    let items = populate(&state, &wishlist).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}
