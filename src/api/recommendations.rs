use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use crate::api::{response::ApiError, AppState};
use crate::services::recommendation::RecommendationStrategy;
use crate::storage::StorageError;

async fn recommend_with(
    strategy: &dyn RecommendationStrategy,
    user_id: i32,
    failure_message: &str,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match strategy.recommend(user_id).await {
        Ok(events) => Ok((StatusCode::OK, Json(json!(events)))),
        Err(StorageError::UserNotFound) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        )),
        Err(err) => {
            error!("{}: {}", failure_message, err);
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure_message))
        }
    }
}

pub async fn preference_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    recommend_with(
        state.recommenders.preference.as_ref(),
        user_id,
        "Failed to fetch recommended events",
    )
    .await
}

pub async fn collaborative_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    recommend_with(
        state.recommenders.collaborative.as_ref(),
        user_id,
        "Failed to fetch collaborative recommendations",
    )
    .await
}

pub async fn ai_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    recommend_with(
        state.recommenders.ai.as_ref(),
        user_id,
        "Failed to fetch AI recommendations",
    )
    .await
}
