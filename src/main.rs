use mawsim::api::{self, AppState};
use mawsim::config::Config;
use mawsim::storage::{PgStorage, Storage};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mawsim=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mawsim v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    if config.stripe_secret_key.is_none() {
        warn!("STRIPE_SECRET_KEY is not set; payment endpoints will be unavailable");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; AI recommendations will fall back to trending events");
    }

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    info!("Database connected");

    let storage: Arc<dyn Storage> = Arc::new(PgStorage::new(pool));
    let state = AppState::new(storage, &config);

    let app = api::build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
