pub mod events;
pub mod health;
pub mod payments;
pub mod recommendations;
pub mod response;
pub mod tickets;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::Config;
use crate::services::{OpenAiClient, Recommenders, StripeClient};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub payments: Option<StripeClient>,
    pub webhook_secret: Option<String>,
    pub recommenders: Recommenders,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let payments = config.stripe_secret_key.clone().map(StripeClient::new);
        let llm = config.openai_api_key.clone().map(OpenAiClient::new);

        Self {
            storage: storage.clone(),
            payments,
            webhook_secret: config.stripe_webhook_secret.clone(),
            recommenders: Recommenders::new(storage, llm),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/events", get(events::list_events))
        .route("/api/events", post(events::create_event))
        // Fixed paths must be registered alongside the `{id}` route; axum
        // gives static segments precedence.
        .route("/api/events/featured", get(events::featured_events))
        .route("/api/events/trending", get(events::trending_events))
        .route("/api/events/category/{category}", get(events::events_by_category))
        .route("/api/events/{id}", get(events::get_event))
        .route("/api/recommendations/{user_id}", get(recommendations::preference_recommendations))
        .route("/api/ai-recommendations/{user_id}", get(recommendations::ai_recommendations))
        .route(
            "/api/collaborative-recommendations/{user_id}",
            get(recommendations::collaborative_recommendations),
        )
        .route("/api/create-payment-intent", post(payments::create_payment_intent))
        .route("/api/stripe-webhook", post(payments::stripe_webhook))
        .route("/api/tickets", post(tickets::book_tickets))
        .route("/api/users/{user_id}/tickets", get(tickets::list_user_tickets))
        .route("/api/users/{id}", get(users::get_user).put(users::update_profile))
        .with_state(state)
}
