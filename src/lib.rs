pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use axum::{
    routing::{get, put},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use services::announcements::AnnouncementService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when running on the in-memory backend.
    pub db: Option<PgPool>,
    pub announcements: AnnouncementService,
}

/// Announcement routes under `mount_path`, plus `/health` and `/metrics`.
pub fn build_router(state: AppState, mount_path: &str) -> Router {
    let base = mount_path.trim_end_matches('/');
    let collection = if base.is_empty() { "/" } else { base };
    let item = format!("{base}/{{announcement_id}}");

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route(
            collection,
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            &item,
            put(routes::announcements::update_announcement)
                .delete(routes::announcements::delete_announcement),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
