use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shop_core::{Category, CategoryInput, CategoryRepository};
use tracing::instrument;

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = state.store.list_categories().await?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let category = state.store.get_category(&id).await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let category = state.store.insert_category(Category::new(&input.name)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "category": category })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let category = state.store.rename_category(&id, &input.name).await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let category = state.store.get_category(&id).await?;
    state.store.delete_category(&id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Category deleted successfully",
        "category": category,
    })))
}
