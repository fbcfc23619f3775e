//! In-process backends. Used by the test suite and by `STORE_BACKEND=memory`
//! for running the API without PostgreSQL.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{AnnouncementStore, StoreError, TeacherDirectory};
use crate::models::{
    announcement::{Announcement, AnnouncementUpdate, NewAnnouncement},
    teacher::Teacher,
};

/// Insertion-ordered announcement collection.
#[derive(Clone, Default)]
pub struct MemoryAnnouncementStore {
    records: Arc<Mutex<Vec<Announcement>>>,
}

impl MemoryAnnouncementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<Announcement>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("announcement store lock poisoned".into()))
    }
}

#[async_trait]
impl AnnouncementStore for MemoryAnnouncementStore {
    async fn find_current(&self, now: &str) -> Result<Vec<Announcement>, StoreError> {
        Ok(self
            .records()?
            .iter()
            .filter(|a| a.expiration.as_str() > now)
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Announcement>, StoreError> {
        Ok(self.records()?.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_one(&self, record: NewAnnouncement) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.records()?.push(record.with_id(id.clone()));
        Ok(id)
    }

    async fn update_one(&self, id: &str, update: &AnnouncementUpdate) -> Result<u64, StoreError> {
        let mut records = self.records()?;
        match records.iter_mut().find(|a| a.id == id) {
            Some(ann) => {
                update.apply_to(ann);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: &str) -> Result<u64, StoreError> {
        let mut records = self.records()?;
        match records.iter().position(|a| a.id == id) {
            Some(idx) => {
                records.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn purge_expired(&self, before: &str) -> Result<u64, StoreError> {
        let mut records = self.records()?;
        let len = records.len();
        records.retain(|a| a.expiration.as_str() > before);
        Ok((len - records.len()) as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records()?.len() as u64)
    }
}

/// Fixed set of teachers, seeded at construction.
#[derive(Clone, Default)]
pub struct MemoryTeacherDirectory {
    teachers: Arc<Mutex<Vec<Teacher>>>,
}

impl MemoryTeacherDirectory {
    pub fn with_usernames<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let teachers = usernames.into_iter().map(Teacher::new).collect();
        Self {
            teachers: Arc::new(Mutex::new(teachers)),
        }
    }
}

#[async_trait]
impl TeacherDirectory for MemoryTeacherDirectory {
    async fn find_one(&self, username: &str) -> Result<Option<Teacher>, StoreError> {
        let teachers = self
            .teachers
            .lock()
            .map_err(|_| StoreError::Unavailable("teacher directory lock poisoned".into()))?;
        Ok(teachers.iter().find(|t| t.username == username).cloned())
    }
}
