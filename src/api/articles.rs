use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_article_id;
use super::{
    ApiError, ApiResponse, AppState, ArticleDto, ArticleRequest, GenerateArticleRequest,
    SearchParams,
};

fn to_dtos(articles: Vec<crate::domain::Article>) -> Vec<ArticleDto> {
    articles.into_iter().map(ArticleDto::from).collect()
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ArticleDto>>>, ApiError> {
    let articles = state.articles().list().await?;
    Ok(Json(ApiResponse::success(to_dtos(articles))))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ArticleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleDto>>), ApiError> {
    let article = state.articles().create(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(article.into())),
    ))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleDto>>, ApiError> {
    let id = validate_article_id(id)?;
    let article = state.articles().get(id).await?;
    Ok(Json(ApiResponse::success(article.into())))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ArticleRequest>,
) -> Result<Json<ApiResponse<ArticleDto>>, ApiError> {
    let id = validate_article_id(id)?;
    let article = state.articles().update(id, payload.into()).await?;
    Ok(Json(ApiResponse::success(article.into())))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = validate_article_id(id)?;
    state.articles().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/articles/search?keyword=...`
///
/// Whitespace-separated keywords are ANDed; each must appear in the title or
/// summary, case-insensitively. A blank keyword lists everything.
pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<ArticleDto>>>, ApiError> {
    let articles = state.articles().search(&params.keyword).await?;
    Ok(Json(ApiResponse::success(to_dtos(articles))))
}

/// `POST /api/articles/generate`
pub async fn generate_article(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateArticleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleDto>>), ApiError> {
    let article = state
        .generator()
        .generate_from_url(&payload.url, &payload.memo)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(article.into())),
    ))
}
