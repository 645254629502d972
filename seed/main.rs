use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;

use mawsim::config::Config;
use mawsim::models::{CreateEvent, EventCategory};
use mawsim::storage::{PgStorage, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    let storage = PgStorage::new(pool);

    if storage.count_events().await? > 0 {
        println!("Events already present, skipping seed.");
        return Ok(());
    }

    let now = Utc::now();
    let events = vec![
        CreateEvent {
            title: "Soundstorm Festival".to_string(),
            description: "Three days of electronic music on the outskirts of Riyadh, \
                          with international headliners across eight stages."
                .to_string(),
            location: "Banban".to_string(),
            city: "Riyadh".to_string(),
            date: now + Duration::days(45),
            end_date: Some(now + Duration::days(48)),
            price: 450,
            capacity: 20000,
            category: EventCategory::Music,
            image_url: "https://images.mawsim.sa/events/soundstorm.jpg".to_string(),
            video_url: Some("https://videos.mawsim.sa/events/soundstorm.mp4".to_string()),
            organizer: "MDLBEAST".to_string(),
            featured: true,
            trending: true,
        },
        CreateEvent {
            title: "Boulevard Riyadh City".to_string(),
            description: "Restaurants, live shows and seasonal attractions in the \
                          heart of the Riyadh Season zone."
                .to_string(),
            location: "Hittin District".to_string(),
            city: "Riyadh".to_string(),
            date: now + Duration::days(7),
            end_date: Some(now + Duration::days(90)),
            price: 100,
            capacity: 50000,
            category: EventCategory::Entertainment,
            image_url: "https://images.mawsim.sa/events/boulevard.jpg".to_string(),
            video_url: None,
            organizer: "Riyadh Season".to_string(),
            featured: true,
            trending: false,
        },
        CreateEvent {
            title: "Saudi Arabian Grand Prix".to_string(),
            description: "Formula 1 night race on the fastest street circuit in the \
                          world, along the Jeddah Corniche."
                .to_string(),
            location: "Jeddah Corniche Circuit".to_string(),
            city: "Jeddah".to_string(),
            date: now + Duration::days(120),
            end_date: Some(now + Duration::days(122)),
            price: 950,
            capacity: 40000,
            category: EventCategory::Sports,
            image_url: "https://images.mawsim.sa/events/jeddah-gp.jpg".to_string(),
            video_url: Some("https://videos.mawsim.sa/events/jeddah-gp.mp4".to_string()),
            organizer: "Saudi Motorsport Company".to_string(),
            featured: false,
            trending: true,
        },
        CreateEvent {
            title: "Winter at Tantora".to_string(),
            description: "Heritage concerts and hot-air balloon mornings among the \
                          historic sites of AlUla."
                .to_string(),
            location: "Old Town AlUla".to_string(),
            city: "AlUla".to_string(),
            date: now + Duration::days(60),
            end_date: Some(now + Duration::days(75)),
            price: 300,
            capacity: 5000,
            category: EventCategory::Cultural,
            image_url: "https://images.mawsim.sa/events/tantora.jpg".to_string(),
            video_url: None,
            organizer: "Royal Commission for AlUla".to_string(),
            featured: true,
            trending: false,
        },
        CreateEvent {
            title: "Riyadh International Book Fair".to_string(),
            description: "The region's largest publishing fair, with author talks, \
                          signings and a children's literature pavilion."
                .to_string(),
            location: "King Saud University".to_string(),
            city: "Riyadh".to_string(),
            date: now + Duration::days(30),
            end_date: Some(now + Duration::days(39)),
            price: 0,
            capacity: 30000,
            category: EventCategory::Educational,
            image_url: "https://images.mawsim.sa/events/book-fair.jpg".to_string(),
            video_url: None,
            organizer: "Literature Commission".to_string(),
            featured: false,
            trending: false,
        },
        CreateEvent {
            title: "Biban Forum".to_string(),
            description: "Entrepreneurship forum connecting Saudi startups with \
                          investors, with workshops and a pitch competition."
                .to_string(),
            location: "Riyadh Front Exhibition Center".to_string(),
            city: "Riyadh".to_string(),
            date: now + Duration::days(90),
            end_date: Some(now + Duration::days(93)),
            price: 50,
            capacity: 15000,
            category: EventCategory::Business,
            image_url: "https://images.mawsim.sa/events/biban.jpg".to_string(),
            video_url: None,
            organizer: "Monsha'at".to_string(),
            featured: false,
            trending: false,
        },
        CreateEvent {
            title: "Asir Family Carnival".to_string(),
            description: "Mountain-side rides, folk performances and food trucks for \
                          the whole family in the Abha highlands."
                .to_string(),
            location: "Al Muftaha Village".to_string(),
            city: "Abha".to_string(),
            date: now + Duration::days(20),
            end_date: Some(now + Duration::days(50)),
            price: 35,
            capacity: 10000,
            category: EventCategory::Family,
            image_url: "https://images.mawsim.sa/events/asir-carnival.jpg".to_string(),
            video_url: None,
            organizer: "Asir Development Authority".to_string(),
            featured: false,
            trending: true,
        },
        CreateEvent {
            title: "Red Sea Food Festival".to_string(),
            description: "Coastal food festival with chefs from across the kingdom, \
                          night markets and live cooking stages."
                .to_string(),
            location: "Jeddah Waterfront".to_string(),
            city: "Jeddah".to_string(),
            date: now + Duration::days(14),
            end_date: Some(now + Duration::days(24)),
            price: 75,
            capacity: 25000,
            category: EventCategory::Entertainment,
            image_url: "https://images.mawsim.sa/events/red-sea-food.jpg".to_string(),
            video_url: None,
            organizer: "Jeddah Season".to_string(),
            featured: true,
            trending: false,
        },
    ];

    let total = events.len();
    for event in events {
        let created = storage.create_event(event).await?;
        println!("  - {} ({})", created.title, created.city);
    }

    println!("Seeding complete: {total} events added.");

    Ok(())
}
