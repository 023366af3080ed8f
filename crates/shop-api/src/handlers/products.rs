//! Catalog products. Reads are public; writes need the seller token,
//! except reviews which any signed-in customer may leave once.

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
use shop_core::{
    CategoryRepository, NewProduct, NewReview, ProductRepository, ProductUpdate, ShopError,
};
use tracing::{info, instrument};

#[instrument(skip(state, _admin, payload))]
pub async fn add(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let product = input.validate()?;
    state.store.ensure_category(product.category.as_str()).await?;
    let product = state.store.insert_product(product).await?;

    info!(product_id = %product.id, number = %product.product_number, "Product added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product added successfully",
            "product": product,
        })),
    ))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let products = state.store.list_products().await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = state.store.get_product(&id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(update) = payload?;
    if let Some(category) = &update.category {
        state.store.ensure_category(category.as_str()).await?;
    }
    let product = state.store.update_product(&id, update).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product updated",
        "product": product,
    })))
}

#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_product(&id).await?;
    Ok(Json(json!({ "success": true, "message": "Product Deleted" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockToggle {
    #[serde(default)]
    pub product_id: String,
    pub in_stock: Option<bool>,
}

#[instrument(skip(state, _admin, payload))]
pub async fn set_stock(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<StockToggle>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(toggle) = payload?;
    let in_stock = match (toggle.product_id.trim(), toggle.in_stock) {
        ("", _) | (_, None) => {
            return Err(ShopError::validation("productId and inStock are required").into())
        }
        (_, Some(flag)) => flag,
    };

    let product = state
        .store
        .set_in_stock(toggle.product_id.trim(), in_stock)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Stock status updated",
        "product": product,
    })))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id()))]
pub async fn add_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(review) = payload?;
    let product = state.store.add_review(&id, auth.id(), review).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Review added", "product": product })),
    ))
}
