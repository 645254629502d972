use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{response::ApiError, AppState};
use crate::models::BookTicket;
use crate::storage::StorageError;

pub async fn book_tickets(
    State(state): State<AppState>,
    Json(payload): Json<BookTicket>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if let Err(errors) = payload.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid ticket data", "errors": errors})),
        ));
    }

    match state.storage.create_ticket(payload, None).await {
        Ok(ticket) => {
            info!(
                "Booked {} ticket(s) for event {} ({})",
                ticket.quantity, ticket.event_id, ticket.booking_reference
            );
            Ok((StatusCode::CREATED, Json(json!(ticket))))
        }
        Err(StorageError::EventNotFound) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Event not found"})),
        )),
        Err(err @ (StorageError::InsufficientTickets | StorageError::InvalidQuantity)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": err.to_string()})),
        )),
        Err(err) => {
            error!("Failed to book tickets: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to book tickets",
            ))
        }
    }
}

pub async fn list_user_tickets(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.storage.list_tickets_by_user(user_id).await {
        Ok(tickets) => Ok((StatusCode::OK, Json(json!(tickets)))),
        Err(err) => {
            error!("Failed to fetch user tickets: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch user tickets",
            ))
        }
    }
}
