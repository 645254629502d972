//! Event recommendations: one strategy interface, three implementations
//! (preference filter, category-overlap heuristic, LLM-backed), selected
//! by route.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Event, User};
use crate::storage::{Storage, StorageError};

use super::llm::{ChatMessage, ChatRequest, LlmError, OpenAiClient, ResponseFormat};

const RECOMMENDATION_MODEL: &str = "gpt-4o";

/// Below this catalog size the model adds nothing over trending events.
const MIN_CATALOG_SIZE: usize = 5;
const MIN_AI_RESULTS: usize = 5;
const MAX_AI_RESULTS: usize = 8;
const MAX_COLLABORATIVE_RESULTS: usize = 5;

#[async_trait]
pub trait RecommendationStrategy: Send + Sync {
    async fn recommend(&self, user_id: i32) -> Result<Vec<Event>, StorageError>;
}

/// The three strategies wired up for the API routes.
#[derive(Clone)]
pub struct Recommenders {
    pub preference: Arc<dyn RecommendationStrategy>,
    pub collaborative: Arc<dyn RecommendationStrategy>,
    pub ai: Arc<dyn RecommendationStrategy>,
}

impl Recommenders {
    pub fn new(storage: Arc<dyn Storage>, llm: Option<OpenAiClient>) -> Self {
        Self {
            preference: Arc::new(PreferenceRecommender {
                storage: storage.clone(),
            }),
            collaborative: Arc::new(CollaborativeRecommender {
                storage: storage.clone(),
            }),
            ai: Arc::new(AiRecommender {
                storage,
                client: llm,
            }),
        }
    }
}

/// Events whose category is in the user's preference tags; featured
/// events when the user has no preferences or nothing matches.
pub struct PreferenceRecommender {
    pub storage: Arc<dyn Storage>,
}

#[async_trait]
impl RecommendationStrategy for PreferenceRecommender {
    async fn recommend(&self, user_id: i32) -> Result<Vec<Event>, StorageError> {
        let user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(StorageError::UserNotFound)?;

        if user.preferences.is_empty() {
            return self.storage.list_featured_events().await;
        }

        let matches = self.storage.list_events_by_categories(&user.preferences).await?;
        if matches.is_empty() {
            return self.storage.list_featured_events().await;
        }

        Ok(matches)
    }
}

/// Other events sharing a category with the user's booked events,
/// excluding the ones already booked. Featured events for users with no
/// bookings, or when the heuristic fails partway.
pub struct CollaborativeRecommender {
    pub storage: Arc<dyn Storage>,
}

impl CollaborativeRecommender {
    async fn by_category_overlap(&self, user_id: i32) -> Result<Vec<Event>, StorageError> {
        let tickets = self.storage.list_tickets_by_user(user_id).await?;
        if tickets.is_empty() {
            return self.storage.list_featured_events().await;
        }

        let booked: HashSet<i32> = tickets.iter().map(|ticket| ticket.event_id).collect();
        let all_events = self.storage.list_events().await?;

        let booked_categories: HashSet<_> = all_events
            .iter()
            .filter(|event| booked.contains(&event.id))
            .map(|event| event.category)
            .collect();

        let mut recommended: Vec<Event> = all_events
            .into_iter()
            .filter(|event| booked_categories.contains(&event.category) && !booked.contains(&event.id))
            .collect();
        recommended.truncate(MAX_COLLABORATIVE_RESULTS);

        Ok(recommended)
    }
}

#[async_trait]
impl RecommendationStrategy for CollaborativeRecommender {
    async fn recommend(&self, user_id: i32) -> Result<Vec<Event>, StorageError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or(StorageError::UserNotFound)?;

        match self.by_category_overlap(user_id).await {
            Ok(events) => Ok(events),
            Err(err) => {
                warn!("Collaborative recommendations failed, falling back to featured: {}", err);
                self.storage.list_featured_events().await
            }
        }
    }
}

/// Delegates the ranking to an external model: the user profile, attended
/// events and the whole catalog go into the prompt, a JSON list of event
/// ids comes back. Trending events on any adapter failure.
pub struct AiRecommender {
    pub storage: Arc<dyn Storage>,
    pub client: Option<OpenAiClient>,
}

#[derive(Debug, Deserialize)]
struct RecommendedIds {
    #[serde(default, rename = "recommendedEvents")]
    recommended_events: Vec<i32>,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: i32,
    title: &'a str,
    category: crate::models::EventCategory,
    description: String,
    city: &'a str,
    trending: bool,
    featured: bool,
}

#[derive(Serialize)]
struct AttendedEntry<'a> {
    id: i32,
    title: &'a str,
    category: crate::models::EventCategory,
}

impl AiRecommender {
    async fn generate(&self, user: &User) -> anyhow::Result<Vec<Event>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not configured"))?;

        let all_events = self.storage.list_events().await?;
        if user.preferences.is_empty() || all_events.len() < MIN_CATALOG_SIZE {
            return Ok(self.storage.list_trending_events().await?);
        }

        let tickets = self.storage.list_tickets_by_user(user.id).await?;
        let attended: HashSet<i32> = tickets.iter().map(|ticket| ticket.event_id).collect();
        let attended_events: Vec<&Event> = all_events
            .iter()
            .filter(|event| attended.contains(&event.id))
            .collect();

        let prompt = build_prompt(user, &attended_events, &all_events)?;
        let request = ChatRequest {
            model: RECOMMENDATION_MODEL.to_string(),
            messages: vec![
                ChatMessage::system(
                    "You are an event recommendation specialist. Recommend events to \
                     users based on their preferences and past event attendance.",
                ),
                ChatMessage::user(prompt),
            ],
            response_format: Some(ResponseFormat::json_object()),
            temperature: 0.7,
            max_tokens: 1000,
        };

        let response = client.chat(request).await?;
        let content = response.content().ok_or(LlmError::EmptyResponse)?;
        let parsed: RecommendedIds = serde_json::from_str(content)?;

        let mut recommended: Vec<Event> = all_events
            .iter()
            .filter(|event| {
                parsed.recommended_events.contains(&event.id) && !attended.contains(&event.id)
            })
            .cloned()
            .collect();

        // Too few survivors after validation: pad with trending events the
        // user has not seen yet.
        if recommended.len() < MIN_AI_RESULTS {
            let seen: HashSet<i32> = recommended.iter().map(|event| event.id).collect();
            for event in self.storage.list_trending_events().await? {
                if !attended.contains(&event.id) && !seen.contains(&event.id) {
                    recommended.push(event);
                }
            }
        }
        recommended.truncate(MAX_AI_RESULTS);

        Ok(recommended)
    }
}

#[async_trait]
impl RecommendationStrategy for AiRecommender {
    async fn recommend(&self, user_id: i32) -> Result<Vec<Event>, StorageError> {
        let user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(StorageError::UserNotFound)?;

        match self.generate(&user).await {
            Ok(events) => Ok(events),
            Err(err) => {
                warn!("AI recommendations failed, falling back to trending: {}", err);
                self.storage.list_trending_events().await
            }
        }
    }
}

fn build_prompt(user: &User, attended: &[&Event], catalog: &[Event]) -> anyhow::Result<String> {
    let catalog_entries: Vec<CatalogEntry> = catalog
        .iter()
        .map(|event| CatalogEntry {
            id: event.id,
            title: &event.title,
            category: event.category,
            description: truncate(&event.description, 100),
            city: &event.city,
            trending: event.trending,
            featured: event.featured,
        })
        .collect();

    let attended_entries: Vec<AttendedEntry> = attended
        .iter()
        .map(|event| AttendedEntry {
            id: event.id,
            title: &event.title,
            category: event.category,
        })
        .collect();

    let preferences = serde_json::to_string(&user.preferences)?;

    Ok(format!(
        "Please analyze the following data and recommend events for the user.\n\n\
         USER PROFILE:\n\
         Username: {}\n\
         Preferences: {}\n\n\
         PAST ATTENDED EVENTS:\n{}\n\n\
         AVAILABLE EVENTS:\n{}\n\n\
         Based on the user's preferences and past attended events, recommend up to {} \
         events that this user might be interested in. Consider category preferences, \
         location, and trending/featured status. Do not recommend events the user has \
         already attended.\n\n\
         Provide your response in JSON format with an array of event IDs:\n\
         {{\"recommendedEvents\": [1, 2, 3, 4]}}",
        user.username,
        preferences,
        serde_json::to_string_pretty(&attended_entries)?,
        serde_json::to_string_pretty(&catalog_entries)?,
        MAX_AI_RESULTS,
    ))
}

/// Character-boundary-safe truncation; event descriptions are Arabic more
/// often than not.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
