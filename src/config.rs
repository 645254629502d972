use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: String,

    /// Payment endpoints answer 500 until this is set.
    pub stripe_secret_key: Option<String>,

    /// Webhook signatures are only verified when this is set.
    pub stripe_webhook_secret: Option<String>,

    /// AI recommendations fall back to trending events without it.
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "5000".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
        }
    }
}
