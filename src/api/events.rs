use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::api::{response::ApiError, AppState};
use crate::models::{CreateEvent, EventCategory};

pub async fn list_events(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.list_events().await {
        Ok(events) => Ok((StatusCode::OK, Json(json!(events)))),
        Err(err) => {
            error!("Failed to fetch events: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch events",
            ))
        }
    }
}

// The home page renders around an empty list but not around a 404/500,
// so a storage failure degrades to an empty array here.
pub async fn featured_events(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.storage.list_featured_events().await {
        Ok(events) => (StatusCode::OK, Json(json!(events))),
        Err(err) => {
            warn!("Failed to fetch featured events: {}", err);
            (StatusCode::OK, Json(json!([])))
        }
    }
}

pub async fn trending_events(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.storage.list_trending_events().await {
        Ok(events) => (StatusCode::OK, Json(json!(events))),
        Err(err) => {
            warn!("Failed to fetch trending events: {}", err);
            (StatusCode::OK, Json(json!([])))
        }
    }
}

pub async fn events_by_category(
    State(state): State<AppState>,
    Path(category): Path<EventCategory>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.list_events_by_category(category).await {
        Ok(events) => Ok((StatusCode::OK, Json(json!(events)))),
        Err(err) => {
            error!("Failed to fetch events by category: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch events by category",
            ))
        }
    }
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.get_event(event_id).await {
        Ok(Some(event)) => Ok((StatusCode::OK, Json(json!(event)))),
        Ok(None) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Event not found"})),
        )),
        Err(err) => {
            error!("Failed to fetch event: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch event",
            ))
        }
    }
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CreateEvent>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if let Err(errors) = payload.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid event data", "errors": errors})),
        ));
    }

    match state.storage.create_event(payload).await {
        Ok(event) => {
            info!("Created event {} ({})", event.id, event.title);
            Ok((StatusCode::CREATED, Json(json!(event))))
        }
        Err(err) => {
            error!("Failed to create event: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create event",
            ))
        }
    }
}
