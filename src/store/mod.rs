//! Collaborators of the announcement service: the announcement collection and
//! the teacher directory. Handles are injected into `AppState`, never global.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    announcement::{Announcement, AnnouncementUpdate, NewAnnouncement},
    teacher::Teacher,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document collection of announcements keyed by a store-assigned string id.
///
/// Ids are compared as raw strings everywhere, so an id returned from
/// `insert_one` is exactly what `update_one`/`delete_one` must be given.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// All records whose `expiration` sorts strictly after `now`.
    async fn find_current(&self, now: &str) -> Result<Vec<Announcement>, StoreError>;

    async fn find_one(&self, id: &str) -> Result<Option<Announcement>, StoreError>;

    /// Returns the assigned id.
    async fn insert_one(&self, record: NewAnnouncement) -> Result<String, StoreError>;

    /// Returns the matched count (0 or 1).
    async fn update_one(&self, id: &str, update: &AnnouncementUpdate) -> Result<u64, StoreError>;

    /// Returns the deleted count (0 or 1).
    async fn delete_one(&self, id: &str) -> Result<u64, StoreError>;

    /// Removes every record whose `expiration` is at or before `before`.
    async fn purge_expired(&self, before: &str) -> Result<u64, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Read-only lookup of teachers by username.
#[async_trait]
pub trait TeacherDirectory: Send + Sync {
    async fn find_one(&self, username: &str) -> Result<Option<Teacher>, StoreError>;
}
