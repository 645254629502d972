use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{BookTicket, CreateEvent, CreateUser, Event, EventCategory, Ticket, UpdateProfile, User};

use super::{Storage, StorageError};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: i32) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: CreateUser) -> Result<User, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, email, full_name, profile_picture, preferences)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.profile_picture)
        .bind(Json(&user.preferences))
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i32, update: UpdateProfile) -> Result<User, StorageError> {
        let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::UserNotFound)?;

        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(profile_picture) = update.profile_picture {
            user.profile_picture = Some(profile_picture);
        }
        if let Some(preferences) = update.preferences {
            user.preferences = preferences;
        }

        sqlx::query(
            "UPDATE users SET email = $1, full_name = $2, profile_picture = $3, preferences = $4 WHERE id = $5",
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.profile_picture)
        .bind(Json(&user.preferences))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY date ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn get_event(&self, id: i32) -> Result<Option<Event>, StorageError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn list_events_by_category(&self, category: EventCategory) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE category = $1 ORDER BY date ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn list_events_by_categories(&self, categories: &[EventCategory]) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE category = ANY($1) ORDER BY date ASC",
        )
        .bind(categories)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn list_featured_events(&self) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE featured = TRUE ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn list_trending_events(&self) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE trending = TRUE ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn create_event(&self, event: CreateEvent) -> Result<Event, StorageError> {
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events
                 (title, description, location, city, date, end_date, price, capacity,
                  remaining_tickets, category, image_url, video_url, organizer, featured, trending)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.city)
        .bind(event.date)
        .bind(event.end_date)
        .bind(event.price)
        .bind(event.capacity)
        .bind(event.category)
        .bind(&event.image_url)
        .bind(&event.video_url)
        .bind(&event.organizer)
        .bind(event.featured)
        .bind(event.trending)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn count_events(&self) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_ticket(
        &self,
        booking: BookTicket,
        payment_intent_id: Option<&str>,
    ) -> Result<Ticket, StorageError> {
        if booking.quantity <= 0 {
            return Err(StorageError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        // The row lock serializes concurrent bookings for the same event,
        // so the inventory check below cannot go stale before the commit.
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(booking.event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::EventNotFound)?;

        if let Some(intent_id) = payment_intent_id {
            let existing = sqlx::query_as::<_, Ticket>(
                "SELECT * FROM tickets WHERE payment_intent_id = $1",
            )
            .bind(intent_id)
            .fetch_optional(&mut *tx)
            .await?;

            // Redelivered webhook: the ticket already exists, leave
            // inventory untouched.
            if let Some(ticket) = existing {
                return Ok(ticket);
            }
        }

        if event.remaining_tickets < booking.quantity {
            return Err(StorageError::InsufficientTickets);
        }

        sqlx::query("UPDATE events SET remaining_tickets = remaining_tickets - $1 WHERE id = $2")
            .bind(booking.quantity)
            .bind(booking.event_id)
            .execute(&mut *tx)
            .await?;

        let ticket = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets
                 (user_id, event_id, quantity, total_price, status, payment_method,
                  booking_reference, payment_intent_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(booking.user_id)
        .bind(booking.event_id)
        .bind(booking.quantity)
        .bind(event.price * booking.quantity)
        .bind(booking.status)
        .bind(&booking.payment_method)
        .bind(Ticket::generate_reference())
        .bind(payment_intent_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ticket)
    }

    async fn list_tickets_by_user(&self, user_id: i32) -> Result<Vec<Ticket>, StorageError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }
}
