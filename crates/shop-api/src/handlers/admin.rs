//! Seller login. There is a single admin account, configured through
//! `SELLER_EMAIL` / `SELLER_PASSWORD`.

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shop_stripe::constant_time_compare;
use shop_core::{Credentials, ShopError};
use tracing::{instrument, warn};

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(credentials) = payload?;
    credentials.validate()?;

    let (Some(email), Some(password)) = (
        state.config.seller_email.as_deref(),
        state.config.seller_password.as_deref(),
    ) else {
        return Err(ShopError::Configuration(
            "SELLER_EMAIL and SELLER_PASSWORD must be set".to_string(),
        )
        .into());
    };

    let email_ok = email.eq_ignore_ascii_case(credentials.email.trim());
    let password_ok = constant_time_compare(password, &credentials.password);
    if !(email_ok && password_ok) {
        warn!("Rejected admin login");
        return Err(ShopError::Unauthorized("Invalid credentials".to_string()).into());
    }

    let token = state.tokens.issue_admin_token(email)?;
    Ok(Json(json!({ "success": true, "token": token })))
}

pub async fn profile(admin: AdminUser) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "admin": { "email": admin.claims.email, "role": admin.claims.role },
    }))
}
