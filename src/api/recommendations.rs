use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, BookRecommendationsDto};

/// `GET /api/book-recommendations`
///
/// Serves the cached list while it is fresh, otherwise regenerates it from the
/// saved articles.
pub async fn get_book_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BookRecommendationsDto>>, ApiError> {
    let cache = state.recommendations().get_recommendations().await?;
    Ok(Json(ApiResponse::success(cache.into())))
}
