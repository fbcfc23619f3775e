use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use announcements_api::{
    build_router,
    config::{Config, StoreBackend},
    db::{self, announcements::PgAnnouncementStore, teachers::PgTeacherDirectory},
    services::announcements::AnnouncementService,
    store::memory::{MemoryAnnouncementStore, MemoryTeacherDirectory},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Missing required env var: DATABASE_URL"))?;
            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");

            let announcements = AnnouncementService::new(
                Arc::new(PgAnnouncementStore::new(pool.clone())),
                Arc::new(PgTeacherDirectory::new(pool.clone())),
            );
            AppState { db: Some(pool), announcements }
        }
        StoreBackend::Memory => {
            info!(
                "In-memory store enabled with {} seeded teacher(s)",
                config.seed_teachers.len()
            );
            let announcements = AnnouncementService::new(
                Arc::new(MemoryAnnouncementStore::new()),
                Arc::new(MemoryTeacherDirectory::with_usernames(config.seed_teachers.clone())),
            );
            AppState { db: None, announcements }
        }
    };

    // Allow the app base URL and localhost during development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        match origin.to_str() {
            Ok(o) => {
                o == base_url
                    || o.starts_with("http://localhost")
                    || o.starts_with("http://127.0.0.1")
            }
            Err(_) => false,
        }
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(cors_origin);

    let app = build_router(state, &config.mount_path).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    info!("announcements API listening on {} (mounted at {})", addr, config.mount_path);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
