pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStorage;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BookTicket, CreateEvent, CreateUser, Event, EventCategory, Ticket, UpdateProfile, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not enough tickets available")]
    InsufficientTickets,

    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Event not found")]
    EventNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Capability boundary over the relational store. Postgres is the only
/// production implementation; the in-memory one exists for unit tests.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: CreateUser) -> Result<User, StorageError>;
    async fn update_user(&self, id: i32, update: UpdateProfile) -> Result<User, StorageError>;

    async fn list_events(&self) -> Result<Vec<Event>, StorageError>;
    async fn get_event(&self, id: i32) -> Result<Option<Event>, StorageError>;
    async fn list_events_by_category(&self, category: EventCategory) -> Result<Vec<Event>, StorageError>;
    async fn list_events_by_categories(&self, categories: &[EventCategory]) -> Result<Vec<Event>, StorageError>;
    async fn list_featured_events(&self) -> Result<Vec<Event>, StorageError>;
    async fn list_trending_events(&self) -> Result<Vec<Event>, StorageError>;
    async fn create_event(&self, event: CreateEvent) -> Result<Event, StorageError>;
    async fn count_events(&self) -> Result<i64, StorageError>;

    /// Books `booking.quantity` tickets for an event, decrementing its
    /// remaining inventory in the same atomic unit. When
    /// `payment_intent_id` is set and a ticket for that intent already
    /// exists, the existing ticket is returned and nothing is mutated
    /// (webhook redelivery).
    async fn create_ticket(
        &self,
        booking: BookTicket,
        payment_intent_id: Option<&str>,
    ) -> Result<Ticket, StorageError>;
    async fn list_tickets_by_user(&self, user_id: i32) -> Result<Vec<Ticket>, StorageError>;
}
