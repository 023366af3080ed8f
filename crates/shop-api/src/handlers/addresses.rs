use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shop_core::{Address, AddressDetails, AddressRepository, ShopError};

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<AddressDetails>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(details) = payload?;
    let address = state
        .store
        .insert_address(Address::new(auth.id(), details)?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "address": address })),
    ))
}

/// Customers see their own address book; the seller sees anyone's
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !auth.requester().is_admin && auth.id() != user_id {
        return Err(ShopError::Forbidden("You can only view your own addresses".to_string()).into());
    }
    let addresses = state.store.list_addresses(&user_id).await?;
    Ok(Json(json!({ "success": true, "addresses": addresses })))
}
