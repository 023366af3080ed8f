//! Customer accounts: registration, login, profile and recently viewed.

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{Credentials, ProductRepository, Registration, ShopError, User, UserRepository};
use tracing::{info, instrument};

const INVALID_LOGIN: &str = "Invalid email or password";

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(registration) = payload?;
    let (name, email) = registration.validate()?;

    let password_hash = hash_password(&registration.password)?;
    let user = state
        .store
        .insert_user(User::new(name, email, password_hash))
        .await?;
    let token = state.tokens.issue_user_token(&user)?;

    info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "user": { "_id": user.id, "name": user.name, "email": user.email },
        })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(credentials) = payload?;
    credentials.validate()?;

    let user = state
        .store
        .find_user_by_email(&credentials.email)
        .await?
        .ok_or_else(|| ShopError::Unauthorized(INVALID_LOGIN.to_string()))?;
    if !verify_password(&credentials.password, &user.password_hash)? {
        return Err(ShopError::Unauthorized(INVALID_LOGIN.to_string()).into());
    }

    let token = state.tokens.issue_user_token(&user)?;
    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": { "_id": user.id, "name": user.name, "email": user.email },
    })))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state.store.get_user(auth.id()).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewedRequest {
    #[serde(default)]
    pub product_id: String,
}

pub async fn recently_viewed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user = state.store.get_user(auth.id()).await?;
    Ok(Json(json!({ "success": true, "recentlyViewed": user.recently_viewed })))
}

pub async fn add_recently_viewed(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<RecentlyViewedRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    if request.product_id.trim().is_empty() {
        return Err(ApiError::from(ShopError::validation("Product ID is required")));
    }

    let mut user = state.store.get_user(auth.id()).await?;
    let product = state.store.get_product(request.product_id.trim()).await?;
    user.touch_recently_viewed(&product.id);
    let user = state.store.save_user(user).await?;

    Ok(Json(json!({ "success": true, "recentlyViewed": user.recently_viewed })))
}

pub async fn clear_recently_viewed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let mut user = state.store.get_user(auth.id()).await?;
    user.recently_viewed.clear();
    state.store.save_user(user).await?;
    Ok(Json(json!({ "success": true, "recentlyViewed": [] })))
}
