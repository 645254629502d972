use chrono::{Duration, Utc};
use sqlx::PgPool;

use mawsim::models::{BookTicket, CreateEvent, CreateUser, EventCategory, TicketStatus};
use mawsim::storage::{PgStorage, Storage, StorageError};

fn sample_event(title: &str, capacity: i32) -> CreateEvent {
    CreateEvent {
        title: title.to_string(),
        description: "An evening of music under the Riyadh sky.".to_string(),
        location: "King Fahd Stadium".to_string(),
        city: "Riyadh".to_string(),
        date: Utc::now() + Duration::days(30),
        end_date: None,
        price: 150,
        capacity,
        category: EventCategory::Music,
        image_url: "https://example.com/event.jpg".to_string(),
        video_url: None,
        organizer: "Mawsim".to_string(),
        featured: false,
        trending: false,
    }
}

fn sample_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        password: "hashed-secret".to_string(),
        email: format!("{username}@example.com"),
        full_name: "Test User".to_string(),
        profile_picture: None,
        preferences: vec![],
    }
}

fn booking(user_id: i32, event_id: i32, quantity: i32) -> BookTicket {
    BookTicket {
        user_id,
        event_id,
        quantity,
        payment_method: "credit_card".to_string(),
        status: TicketStatus::Confirmed,
    }
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn booking_decrements_inventory(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 10)).await.unwrap();

    assert_eq!(event.remaining_tickets, 10);

    let ticket = storage
        .create_ticket(booking(user.id, event.id, 3), None)
        .await
        .unwrap();

    assert_eq!(ticket.quantity, 3);
    assert_eq!(ticket.total_price, 450);
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert!(ticket.booking_reference.starts_with("EV-"));

    let event = storage.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.remaining_tickets, 7);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn insufficient_inventory_aborts_without_mutation(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 2)).await.unwrap();

    let err = storage
        .create_ticket(booking(user.id, event.id, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::InsufficientTickets));

    let event = storage.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.remaining_tickets, 2);
    assert!(storage.list_tickets_by_user(user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn non_positive_quantity_is_rejected(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 10)).await.unwrap();

    let err = storage
        .create_ticket(booking(user.id, event.id, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidQuantity));

    let err = storage
        .create_ticket(booking(user.id, event.id, -3), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidQuantity));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn booking_unknown_event_is_not_found(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();

    let err = storage
        .create_ticket(booking(user.id, 999, 1), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::EventNotFound));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn concurrent_bookings_never_oversell(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 10)).await.unwrap();

    // Draw inventory down to the last two tickets.
    storage
        .create_ticket(booking(user.id, event.id, 8), None)
        .await
        .unwrap();

    let (user_id, event_id) = (user.id, event.id);
    let storage_a = storage.clone();
    let storage_b = storage.clone();

    let first = tokio::spawn(async move {
        storage_a.create_ticket(booking(user_id, event_id, 2), None).await
    });
    let second = tokio::spawn(async move {
        storage_b.create_ticket(booking(user_id, event_id, 1), None).await
    });

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one of the two bookings must win");

    let (winner_quantity, loser) = if first.is_ok() {
        (2, second)
    } else {
        (1, first)
    };
    assert!(matches!(loser.unwrap_err(), StorageError::InsufficientTickets));

    let event = storage.get_event(event_id).await.unwrap().unwrap();
    assert_eq!(event.remaining_tickets, 2 - winner_quantity);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn webhook_redelivery_creates_one_ticket(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 10)).await.unwrap();

    let first = storage
        .create_ticket(booking(user.id, event.id, 2), Some("pi_abc123"))
        .await
        .unwrap();
    let second = storage
        .create_ticket(booking(user.id, event.id, 2), Some("pi_abc123"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.booking_reference, second.booking_reference);

    let event = storage.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.remaining_tickets, 8, "inventory decremented once");
    assert_eq!(storage.list_tickets_by_user(user.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn distinct_payment_intents_create_distinct_tickets(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let user = storage.create_user(sample_user("maha")).await.unwrap();
    let event = storage.create_event(sample_event("Soundstorm", 10)).await.unwrap();

    let first = storage
        .create_ticket(booking(user.id, event.id, 1), Some("pi_one"))
        .await
        .unwrap();
    let second = storage
        .create_ticket(booking(user.id, event.id, 1), Some("pi_two"))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);

    let event = storage.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.remaining_tickets, 8);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn remaining_tickets_can_never_exceed_capacity(pool: PgPool) {
    let storage = PgStorage::new(pool.clone());
    let event = storage.create_event(sample_event("Soundstorm", 5)).await.unwrap();

    // The CHECK constraint backstops the invariant even against direct SQL.
    let over = sqlx::query("UPDATE events SET remaining_tickets = capacity + 1 WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await;
    assert!(over.is_err());

    let negative = sqlx::query("UPDATE events SET remaining_tickets = -1 WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await;
    assert!(negative.is_err());
}
