use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::AppError,
    models::{
        announcement::{
            Announcement, AnnouncementInput, AnnouncementUpdate, DeletedAnnouncement,
            NewAnnouncement,
        },
        teacher::Teacher,
    },
    services::{
        clock::{iso_timestamp, Clock, SystemClock},
        metrics,
    },
    store::{AnnouncementStore, TeacherDirectory},
};

/// CRUD over the announcement collection, gated by a teacher-directory
/// existence check. Holds no mutable state of its own.
#[derive(Clone)]
pub struct AnnouncementService {
    store: Arc<dyn AnnouncementStore>,
    teachers: Arc<dyn TeacherDirectory>,
    clock: Arc<dyn Clock>,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn AnnouncementStore>, teachers: Arc<dyn TeacherDirectory>) -> Self {
        Self::with_clock(store, teachers, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn AnnouncementStore>,
        teachers: Arc<dyn TeacherDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, teachers, clock }
    }

    /// Existence lookup only: any username present in the directory passes.
    /// An empty username counts as missing.
    pub async fn require_auth(&self, username: Option<&str>) -> Result<Teacher, AppError> {
        let username = username
            .filter(|u| !u.is_empty())
            .ok_or(AppError::Unauthenticated("Authentication required"))?;

        self.teachers
            .find_one(username)
            .await?
            .ok_or(AppError::Unauthenticated("Invalid credentials"))
    }

    /// Announcements whose expiration is strictly after now.
    pub async fn list(&self) -> Result<Vec<Announcement>, AppError> {
        let now = iso_timestamp(self.clock.now());
        let result = self.store.find_current(&now).await.map_err(AppError::from);

        match self.store.count().await {
            Ok(n) => metrics::STORED_GAUGE.set(n as f64),
            Err(e) => warn!("could not refresh stored announcement gauge: {e}"),
        }

        observe("list", result)
    }

    pub async fn create(
        &self,
        input: AnnouncementInput,
        username: Option<&str>,
    ) -> Result<Announcement, AppError> {
        observe("create", self.create_inner(input, username).await)
    }

    async fn create_inner(
        &self,
        input: AnnouncementInput,
        username: Option<&str>,
    ) -> Result<Announcement, AppError> {
        self.require_auth(username).await?;

        let (Some(message), Some(expiration)) =
            (input.message.non_empty(), input.expiration.non_empty())
        else {
            return Err(AppError::InvalidInput("Message and expiration required"));
        };

        let record = NewAnnouncement {
            message,
            expiration,
            start: input.start.supplied(),
        };
        let id = self.store.insert_one(record.clone()).await?;
        info!(announcement_id = %id, "announcement created");

        Ok(record.with_id(id))
    }

    pub async fn update(
        &self,
        announcement_id: &str,
        input: AnnouncementInput,
        username: Option<&str>,
    ) -> Result<Announcement, AppError> {
        observe("update", self.update_inner(announcement_id, input, username).await)
    }

    async fn update_inner(
        &self,
        announcement_id: &str,
        input: AnnouncementInput,
        username: Option<&str>,
    ) -> Result<Announcement, AppError> {
        self.require_auth(username).await?;

        let update = AnnouncementUpdate {
            message: input.message.supplied(),
            expiration: input.expiration.supplied(),
            start: input.start.supplied(),
        };
        if update.is_empty() {
            return Err(AppError::InvalidInput("No fields to update"));
        }

        let matched = self.store.update_one(announcement_id, &update).await?;
        if matched == 0 {
            return Err(AppError::NotFound("Announcement not found"));
        }

        // A concurrent delete can land between the write and the read back.
        let updated = self
            .store
            .find_one(announcement_id)
            .await?
            .ok_or(AppError::NotFound("Announcement not found"))?;
        info!(announcement_id, "announcement updated");

        Ok(updated)
    }

    pub async fn delete(
        &self,
        announcement_id: &str,
        username: Option<&str>,
    ) -> Result<DeletedAnnouncement, AppError> {
        observe("delete", self.delete_inner(announcement_id, username).await)
    }

    async fn delete_inner(
        &self,
        announcement_id: &str,
        username: Option<&str>,
    ) -> Result<DeletedAnnouncement, AppError> {
        self.require_auth(username).await?;

        let deleted = self.store.delete_one(announcement_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Announcement not found"));
        }
        info!(announcement_id, "announcement deleted");

        Ok(DeletedAnnouncement {
            id: announcement_id.to_string(),
            deleted: true,
        })
    }
}

fn observe<T>(operation: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    match &result {
        Ok(_) => metrics::record(operation, "ok"),
        Err(e) => metrics::record(operation, e.kind()),
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        models::announcement::FieldInput,
        services::clock::FixedClock,
        store::memory::{MemoryAnnouncementStore, MemoryTeacherDirectory},
    };

    const TEACHER: Option<&str> = Some("mrodriguez");

    fn service_at(store: &MemoryAnnouncementStore) -> AnnouncementService {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        AnnouncementService::with_clock(
            Arc::new(store.clone()),
            Arc::new(MemoryTeacherDirectory::with_usernames(["mrodriguez"])),
            Arc::new(FixedClock::new(now)),
        )
    }

    fn input(message: Option<&str>, expiration: Option<&str>, start: Option<&str>) -> AnnouncementInput {
        AnnouncementInput {
            message: message.map(str::to_string).into(),
            expiration: expiration.map(str::to_string).into(),
            start: start.map(str::to_string).into(),
        }
    }

    fn assert_err<T: std::fmt::Debug>(result: Result<T, AppError>, expected: &str, msg: &str) {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), expected);
        assert_eq!(err.to_string(), msg);
    }

    #[tokio::test]
    async fn require_auth_distinguishes_missing_and_unknown() {
        let service = service_at(&MemoryAnnouncementStore::new());

        assert_err(service.require_auth(None).await, "unauthenticated", "Authentication required");
        assert_err(service.require_auth(Some("")).await, "unauthenticated", "Authentication required");
        assert_err(service.require_auth(Some("nobody")).await, "unauthenticated", "Invalid credentials");
        assert_eq!(service.require_auth(TEACHER).await.unwrap().username, "mrodriguez");
    }

    #[tokio::test]
    async fn list_excludes_expired_and_boundary() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);
        for (msg, exp) in [
            ("past", "2024-05-31T00:00:00.000000"),
            ("boundary", "2024-06-01T12:00:00.000000"),
            ("future", "2024-06-01T12:00:00.000001"),
        ] {
            service.create(input(Some(msg), Some(exp), None), TEACHER).await.unwrap();
        }

        let current = service.list().await.unwrap();

        assert_eq!(current.len(), 1);
        assert_eq!(current[0].message, "future");
    }

    #[tokio::test]
    async fn create_rejects_empty_required_fields() {
        let service = service_at(&MemoryAnnouncementStore::new());

        assert_err(
            service.create(input(Some(""), Some("2099-01-01T00:00:00"), None), TEACHER).await,
            "invalid_input",
            "Message and expiration required",
        );
        assert_err(
            service.create(input(Some("hi"), Some(""), None), TEACHER).await,
            "invalid_input",
            "Message and expiration required",
        );
        assert_err(
            service.create(input(None, None, None), TEACHER).await,
            "invalid_input",
            "Message and expiration required",
        );
    }

    #[tokio::test]
    async fn auth_failure_takes_precedence_over_validation() {
        let service = service_at(&MemoryAnnouncementStore::new());

        assert_err(
            service.create(input(None, None, None), None).await,
            "unauthenticated",
            "Authentication required",
        );
        assert_err(
            service.update("missing", input(None, None, None), Some("ghost")).await,
            "unauthenticated",
            "Invalid credentials",
        );
    }

    #[tokio::test]
    async fn unknown_username_cannot_create_valid_announcement() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);

        assert_err(
            service
                .create(input(Some("hi"), Some("2099-01-01T00:00:00"), None), Some("ghost"))
                .await,
            "unauthenticated",
            "Invalid credentials",
        );
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_username_cannot_delete_existing_announcement() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);
        let created = service
            .create(input(Some("hi"), Some("2099-01-01T00:00:00"), None), TEACHER)
            .await
            .unwrap();

        assert_err(
            service.delete(&created.id, Some("ghost")).await,
            "unauthenticated",
            "Invalid credentials",
        );
        assert_eq!(store.find_one(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn create_then_list_round_trips_fields() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);

        let created = service
            .create(
                input(Some("Club fair Friday"), Some("2099-01-01T00:00:00"), Some("2024-06-01T00:00:00")),
                TEACHER,
            )
            .await
            .unwrap();
        let listed = service.list().await.unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn update_without_fields_is_invalid_even_for_unknown_id() {
        let service = service_at(&MemoryAnnouncementStore::new());

        assert_err(
            service.update("missing", input(None, None, None), TEACHER).await,
            "invalid_input",
            "No fields to update",
        );
    }

    #[tokio::test]
    async fn update_writes_empty_string_when_supplied() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);
        let created = service
            .create(input(Some("hi"), Some("2099-01-01T00:00:00"), Some("2024-01-01")), TEACHER)
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id,
                AnnouncementInput {
                    start: FieldInput::Empty,
                    ..Default::default()
                },
                TEACHER,
            )
            .await
            .unwrap();

        assert_eq!(updated.message, "hi");
        assert_eq!(updated.start.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_are_not_found() {
        let service = service_at(&MemoryAnnouncementStore::new());

        assert_err(
            service.update("missing", input(Some("x"), None, None), TEACHER).await,
            "not_found",
            "Announcement not found",
        );
        assert_err(service.delete("missing", TEACHER).await, "not_found", "Announcement not found");
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let store = MemoryAnnouncementStore::new();
        let service = service_at(&store);
        let created = service
            .create(input(Some("hi"), Some("2099-01-01T00:00:00"), None), TEACHER)
            .await
            .unwrap();

        let first = service.delete(&created.id, TEACHER).await.unwrap();
        assert_eq!(first, DeletedAnnouncement { id: created.id.clone(), deleted: true });
        assert_err(service.delete(&created.id, TEACHER).await, "not_found", "Announcement not found");
    }
}
