//! In-memory `Storage` implementation for unit tests. Never used in
//! production; the Postgres variant is the only one wired into main.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{BookTicket, CreateEvent, CreateUser, Event, EventCategory, Ticket, UpdateProfile, User};

use super::{Storage, StorageError};

#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i32, User>,
    events: HashMap<i32, Event>,
    tickets: HashMap<i32, Ticket>,
    next_user_id: i32,
    next_event_id: i32,
    next_ticket_id: i32,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i32) -> Result<Option<User>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn create_user(&self, user: CreateUser) -> Result<User, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_user_id += 1;
        let id = inner.next_user_id;

        let user = User {
            id,
            username: user.username,
            password: user.password,
            email: user.email,
            full_name: user.full_name,
            profile_picture: user.profile_picture,
            preferences: user.preferences,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: i32, update: UpdateProfile) -> Result<User, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.users.get_mut(&id).ok_or(StorageError::UserNotFound)?;

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

        Ok(user.clone())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut events: Vec<Event> = inner.events.values().cloned().collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn get_event(&self, id: i32) -> Result<Option<Event>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.get(&id).cloned())
    }

    async fn list_events_by_category(&self, category: EventCategory) -> Result<Vec<Event>, StorageError> {
        self.list_events_by_categories(&[category]).await
    }

    async fn list_events_by_categories(&self, categories: &[EventCategory]) -> Result<Vec<Event>, StorageError> {
        let mut events: Vec<Event> = {
            let inner = self.inner.lock().unwrap();
            inner
                .events
                .values()
                .filter(|event| categories.contains(&event.category))
                .cloned()
                .collect()
        };
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn list_featured_events(&self) -> Result<Vec<Event>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut events: Vec<Event> = inner.events.values().filter(|event| event.featured).cloned().collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn list_trending_events(&self) -> Result<Vec<Event>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut events: Vec<Event> = inner.events.values().filter(|event| event.trending).cloned().collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn create_event(&self, event: CreateEvent) -> Result<Event, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_event_id += 1;
        let id = inner.next_event_id;

        let event = Event {
            id,
            title: event.title,
            description: event.description,
            location: event.location,
            city: event.city,
            date: event.date,
            end_date: event.end_date,
            price: event.price,
            capacity: event.capacity,
            remaining_tickets: event.capacity,
            category: event.category,
            image_url: event.image_url,
            video_url: event.video_url,
            organizer: event.organizer,
            featured: event.featured,
            trending: event.trending,
            created_at: Utc::now(),
        };
        inner.events.insert(id, event.clone());

        Ok(event)
    }

    async fn count_events(&self) -> Result<i64, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.len() as i64)
    }

    async fn create_ticket(
        &self,
        booking: BookTicket,
        payment_intent_id: Option<&str>,
    ) -> Result<Ticket, StorageError> {
        if booking.quantity <= 0 {
            return Err(StorageError::InvalidQuantity);
        }

        let mut inner = self.inner.lock().unwrap();

        if let Some(intent_id) = payment_intent_id {
            let existing = inner
                .tickets
                .values()
                .find(|ticket| ticket.payment_intent_id.as_deref() == Some(intent_id))
                .cloned();
            if let Some(ticket) = existing {
                return Ok(ticket);
            }
        }

        let price = {
            let event = inner
                .events
                .get_mut(&booking.event_id)
                .ok_or(StorageError::EventNotFound)?;
            if event.remaining_tickets < booking.quantity {
                return Err(StorageError::InsufficientTickets);
            }
            event.remaining_tickets -= booking.quantity;
            event.price
        };

        inner.next_ticket_id += 1;
        let id = inner.next_ticket_id;

        let ticket = Ticket {
            id,
            user_id: booking.user_id,
            event_id: booking.event_id,
            quantity: booking.quantity,
            total_price: price * booking.quantity,
            status: booking.status,
            payment_method: booking.payment_method,
            booking_reference: Ticket::generate_reference(),
            payment_intent_id: payment_intent_id.map(str::to_string),
            created_at: Utc::now(),
        };
        inner.tickets.insert(id, ticket.clone());

        Ok(ticket)
    }

    async fn list_tickets_by_user(&self, user_id: i32) -> Result<Vec<Ticket>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|ticket| ticket.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| ticket.id);
        Ok(tickets)
    }
}
