use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{validate_tag_id, validate_tag_name};
use super::{ApiError, ApiResponse, AppState, TagDto, TagRequest};

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TagDto>>>, ApiError> {
    let tags = state.tags().list().await?;
    let dtos = tags.into_iter().map(TagDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TagDto>>), ApiError> {
    let tag = state.tags().create(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tag.into()))))
}

pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let id = validate_tag_id(id)?;
    let tag = state.tags().get(id).await?;
    Ok(Json(ApiResponse::success(tag.into())))
}

pub async fn get_tag_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let name = validate_tag_name(&name)?;
    let tag = state.tags().get_by_name(name).await?;
    Ok(Json(ApiResponse::success(tag.into())))
}

pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let id = validate_tag_id(id)?;
    let tag = state.tags().rename(id, &payload.name).await?;
    Ok(Json(ApiResponse::success(tag.into())))
}

pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = validate_tag_id(id)?;
    state.tags().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
