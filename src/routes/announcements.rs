use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppError,
    middleware::credential::Credential,
    models::announcement::{Announcement, AnnouncementParams, DeletedAnnouncement},
    AppState,
};

/// GET {mount} — public, current (not yet expired) announcements.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    state.announcements.list().await.map(Json)
}

/// POST {mount}?message=&expiration=&start=&username=
pub async fn create_announcement(
    State(state): State<AppState>,
    credential: Credential,
    params: AnnouncementParams,
) -> Result<Json<Announcement>, AppError> {
    state
        .announcements
        .create(params.into(), credential.username())
        .await
        .map(Json)
}

/// PUT {mount}/{announcement_id} — partial update of supplied fields.
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    credential: Credential,
    params: AnnouncementParams,
) -> Result<Json<Announcement>, AppError> {
    state
        .announcements
        .update(&announcement_id, params.into(), credential.username())
        .await
        .map(Json)
}

/// DELETE {mount}/{announcement_id}
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    credential: Credential,
) -> Result<Json<DeletedAnnouncement>, AppError> {
    state
        .announcements
        .delete(&announcement_id, credential.username())
        .await
        .map(Json)
}
