use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{response::ApiError, AppState};
use crate::models::UpdateProfile;
use crate::storage::StorageError;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.get_user(user_id).await {
        Ok(Some(user)) => Ok((StatusCode::OK, Json(json!(user)))),
        Ok(None) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        )),
        Err(err) => {
            error!("Failed to fetch user: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch user",
            ))
        }
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateProfile>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.update_user(user_id, payload).await {
        Ok(user) => {
            info!("Updated profile for user {}", user_id);
            Ok((StatusCode::OK, Json(json!(user))))
        }
        Err(StorageError::UserNotFound) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        )),
        Err(err) => {
            error!("Failed to update profile: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update profile",
            ))
        }
    }
}
