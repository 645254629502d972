//! Stripe payment gateway adapter: PaymentIntent creation over the REST
//! API and webhook signature verification.

use std::collections::HashMap;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Stripe rejects events older than five minutes by default; we do the same.
pub const SIGNATURE_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("failed to parse response: {0}")]
    ResponseParseFailed(String),

    #[error("{message}")]
    ApiError { status: u16, message: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_url: String,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    /// Minor currency units (halalas for SAR).
    pub amount: i64,
    pub currency: String,
    pub event_id: i32,
    pub user_id: i32,
    pub quantity: i32,
    pub event_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            secret_key,
            api_url: "https://api.stripe.com/v1".to_string(),
        }
    }

    /// Point the client at a different base URL (mock servers in tests).
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub async fn create_payment_intent(
        &self,
        request: CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[eventId]", request.event_id.to_string()),
            ("metadata[userId]", request.user_id.to_string()),
            ("metadata[quantity]", request.quantity.to_string()),
            ("metadata[eventName]", request.event_name.clone()),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", self.api_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<PaymentIntent>()
                .await
                .map_err(|e| PaymentError::ResponseParseFailed(e.to_string())),
            status => {
                let message = response
                    .json::<StripeErrorResponse>()
                    .await
                    .map(|body| body.error.message)
                    .unwrap_or_else(|_| status.to_string());
                Err(PaymentError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// A webhook delivery, parsed from the raw request body.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<PaymentFailure>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentFailure {
    #[serde(default)]
    pub message: Option<String>,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(payload).map_err(|e| PaymentError::MalformedPayload(e.to_string()))
    }
}

impl PaymentIntentObject {
    /// The `{eventId, userId, quantity}` trio attached at intent-creation
    /// time. `None` when any of the three is absent or non-numeric.
    pub fn booking_metadata(&self) -> Option<(i32, i32, i32)> {
        let event_id = self.metadata.get("eventId")?.parse().ok()?;
        let user_id = self.metadata.get("userId")?.parse().ok()?;
        let quantity = self.metadata.get("quantity")?.parse().ok()?;
        Some((event_id, user_id, quantity))
    }

    pub fn failure_message(&self) -> &str {
        self.last_payment_error
            .as_ref()
            .and_then(|failure| failure.message.as_deref())
            .unwrap_or("unknown error")
    }
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// The header carries a unix timestamp and one or more `v1` HMAC-SHA256
/// signatures over `"{timestamp}.{payload}"`. `now` is the verifier's
/// current unix time, used for the replay-tolerance window.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: u64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<u64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".to_string()))?;
    if candidates.is_empty() {
        return Err(PaymentError::InvalidSignature("no v1 signatures".to_string()));
    }

    if now.abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let expected: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();

    if candidates
        .iter()
        .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
    {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature("no matching signature".to_string()))
    }
}
