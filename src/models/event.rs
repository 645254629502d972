use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog categories for the Saudi events market. Stored as a Postgres
/// enum; serialized as lowercase tags so they double as preference tags
/// on the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Cultural,
    Sports,
    Music,
    Educational,
    Entertainment,
    Family,
    Business,
}

/// A bookable occurrence. `remaining_tickets` starts at `capacity` and is
/// only ever decremented inside the booking transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,

    /// Whole Saudi riyals per ticket.
    pub price: i32,
    pub capacity: i32,
    pub remaining_tickets: i32,

    pub category: EventCategory,
    pub image_url: String,
    pub video_url: Option<String>,
    pub organizer: String,
    pub featured: bool,
    pub trending: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub price: i32,
    pub capacity: i32,
    pub category: EventCategory,
    pub image_url: String,
    pub video_url: Option<String>,
    pub organizer: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub trending: bool,
}

impl CreateEvent {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("title: must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            errors.push("description: must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            errors.push("location: must not be empty".to_string());
        }
        if self.city.trim().is_empty() {
            errors.push("city: must not be empty".to_string());
        }
        if self.organizer.trim().is_empty() {
            errors.push("organizer: must not be empty".to_string());
        }
        if self.image_url.trim().is_empty() {
            errors.push("imageUrl: must not be empty".to_string());
        }
        if self.price < 0 {
            errors.push("price: must not be negative".to_string());
        }
        if self.capacity <= 0 {
            errors.push("capacity: must be greater than zero".to_string());
        }
        if let Some(end_date) = self.end_date {
            if end_date < self.date {
                errors.push("endDate: must not be before date".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
