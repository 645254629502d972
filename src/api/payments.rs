use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::api::{response::ApiError, AppState};
use crate::models::{BookTicket, TicketStatus};
use crate::services::payments::{self, CreatePaymentIntent, PaymentError, WebhookEvent};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    pub event_id: i32,
    pub quantity: i32,
    pub user_id: i32,
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(stripe) = &state.payments else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Payment service unavailable",
        ));
    };

    if payload.quantity <= 0 {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "quantity must be greater than zero"})),
        ));
    }

    let event = match state.storage.get_event(payload.event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Event not found"})),
            ))
        }
        Err(err) => {
            error!("Failed to fetch event for payment: {}", err);
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create payment",
            ));
        }
    };

    if event.remaining_tickets < payload.quantity {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Not enough tickets available"})),
        ));
    }

    // Stripe takes the amount in halalas.
    let amount = i64::from(event.price) * i64::from(payload.quantity) * 100;

    let request = CreatePaymentIntent {
        amount,
        currency: "sar".to_string(),
        event_id: event.id,
        user_id: payload.user_id,
        quantity: payload.quantity,
        event_name: event.title.clone(),
    };

    match stripe.create_payment_intent(request).await {
        Ok(intent) => {
            info!("Created payment intent {} for event {}", intent.id, event.id);
            Ok((
                StatusCode::OK,
                Json(json!({"clientSecret": intent.client_secret})),
            ))
        }
        Err(PaymentError::ApiError { message, .. }) => {
            error!("Stripe rejected payment intent: {}", message);
            Ok((StatusCode::BAD_REQUEST, Json(json!({"message": message}))))
        }
        Err(err) => {
            error!("Failed to create payment intent: {}", err);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create payment",
            ))
        }
    }
}

// Signature verification needs the raw body, so this handler takes Bytes
// and parses the JSON itself.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if state.payments.is_none() {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Payment service unavailable",
        ));
    }

    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get("stripe-signature")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        if let Err(err) = payments::verify_signature(&body, signature, secret, now) {
            warn!("Webhook signature verification failed: {}", err);
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {err}"),
            ));
        }
    }

    let event = match WebhookEvent::parse(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Failed to parse webhook payload: {}", err);
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {err}"),
            ));
        }
    };

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let intent = &event.data.object;
            match intent.booking_metadata() {
                Some((event_id, user_id, quantity)) => {
                    let booking = BookTicket {
                        user_id,
                        event_id,
                        quantity,
                        payment_method: "credit_card".to_string(),
                        status: TicketStatus::Confirmed,
                    };

                    // Keyed on the intent id, so a redelivery finds the
                    // existing ticket instead of double-booking.
                    match state.storage.create_ticket(booking, Some(&intent.id)).await {
                        Ok(ticket) => info!(
                            "Payment {} succeeded, ticket {} confirmed",
                            intent.id, ticket.booking_reference
                        ),
                        Err(err) => {
                            error!("Failed to create ticket for payment {}: {}", intent.id, err)
                        }
                    }
                }
                None => warn!(
                    "payment_intent.succeeded without booking metadata: {}",
                    intent.id
                ),
            }
        }
        "payment_intent.payment_failed" => {
            error!("Payment failed: {}", event.data.object.failure_message());
        }
        other => info!("Unhandled webhook event type: {}", other),
    }

    // Acknowledge so the provider stops retrying; booking failures were
    // already logged above.
    Ok((StatusCode::OK, Json(json!({"received": true}))))
}
