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
use shop_core::{BlogCounter, BlogRepository, NewBlog};
use tracing::instrument;

#[instrument(skip(state, _admin, payload))]
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<NewBlog>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let blog = state.store.insert_blog(input.validate()?).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "blog": blog }))))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let blogs = state.store.list_blogs().await?;
    Ok(Json(json!({ "success": true, "blogs": blogs })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let blog = state.store.get_blog(&id).await?;
    Ok(Json(json!({ "success": true, "blog": blog })))
}

#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_blog(&id).await?;
    Ok(Json(json!({ "success": true, "message": "Blog deleted successfully" })))
}

pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let views = state.store.increment_blog(&id, BlogCounter::Views).await?;
    Ok(Json(json!({ "success": true, "blog": { "_id": id, "blogViews": views } })))
}

pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let likes = state.store.increment_blog(&id, BlogCounter::Likes).await?;
    Ok(Json(json!({ "success": true, "blog": { "_id": id, "blogLikes": likes } })))
}
