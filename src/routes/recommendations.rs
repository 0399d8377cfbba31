use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{PreferenceQuery, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(query): Json<PreferenceQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        mood = %query.mood,
        watching_with = ?query.watching_with,
        age_range = ?query.age_range,
        genres = ?query.genres,
        language = ?query.language,
        duration = ?query.duration,
        tags = ?query.tags,
        "Processing recommendation request"
    );

    let timeout = state.recommendation_timeout;
    let movies = tokio::time::timeout(timeout, state.engine.recommend(&query))
        .await
        .map_err(|_| AppError::Timeout(timeout.as_millis() as u64))??;

    tracing::info!(
        request_id = %request_id,
        count = movies.len(),
        "Recommendations returned"
    );

    Ok(Json(RecommendationResponse { movies }))
}
