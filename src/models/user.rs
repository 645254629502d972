use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::EventCategory;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,

    /// Hashed upstream by the auth layer; never serialized in responses.
    #[serde(skip_serializing, default)]
    pub password: String,

    pub email: String,
    pub full_name: String,
    pub profile_picture: Option<String>,

    /// Category tags driving the preference-filter recommendations.
    /// An empty list means the user never picked any.
    #[sqlx(json)]
    pub preferences: Vec<EventCategory>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub preferences: Vec<EventCategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
    pub preferences: Option<Vec<EventCategory>>,
}
