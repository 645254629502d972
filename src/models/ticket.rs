use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
    Completed,
}

/// A booking record for some quantity of an event. Immutable after
/// creation apart from status transitions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i32,
    pub user_id: i32,
    pub event_id: i32,
    pub quantity: i32,

    /// Whole Saudi riyals, computed from the event price at booking time.
    pub total_price: i32,

    pub status: TicketStatus,
    pub payment_method: String,

    /// Human-displayable identifier generated at confirmation time.
    pub booking_reference: String,

    /// Idempotency key for tickets created by the payment webhook.
    pub payment_intent_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicket {
    pub user_id: i32,
    pub event_id: i32,
    pub quantity: i32,
    pub payment_method: String,
    #[serde(default)]
    pub status: TicketStatus,
}

impl BookTicket {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.quantity <= 0 {
            errors.push("quantity: must be greater than zero".to_string());
        }
        if self.payment_method.trim().is_empty() {
            errors.push("paymentMethod: must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Ticket {
    pub fn generate_reference() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("EV-{}", id[..8].to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_reference_is_displayable() {
        let reference = Ticket::generate_reference();

        assert!(reference.starts_with("EV-"));
        assert_eq!(reference.len(), 11);
        assert_ne!(reference, Ticket::generate_reference());
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let booking = BookTicket {
            user_id: 1,
            event_id: 1,
            quantity: 0,
            payment_method: "credit_card".to_string(),
            status: TicketStatus::Confirmed,
        };

        let errors = booking.validate().unwrap_err();
        assert!(errors[0].starts_with("quantity"));
    }
}
