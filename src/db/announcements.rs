use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::announcement::{Announcement, AnnouncementUpdate, NewAnnouncement},
    store::{AnnouncementStore, StoreError},
};

// Byte order, same as the in-memory store, whatever the database default is.
const FIND_CURRENT_SQL: &str = r#"SELECT id, message, expiration, start FROM announcements
     WHERE expiration COLLATE "C" > $1 COLLATE "C"
     ORDER BY created_at"#;

const PURGE_EXPIRED_SQL: &str =
    r#"DELETE FROM announcements WHERE expiration COLLATE "C" <= $1 COLLATE "C""#;

/// `announcements` table. Ids are TEXT holding a server-generated v4 UUID.
#[derive(Clone)]
pub struct PgAnnouncementStore {
    pool: PgPool,
}

impl PgAnnouncementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementStore for PgAnnouncementStore {
    async fn find_current(&self, now: &str) -> Result<Vec<Announcement>, StoreError> {
        let rows = sqlx::query_as::<_, Announcement>(FIND_CURRENT_SQL)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Announcement>, StoreError> {
        let row = sqlx::query_as::<_, Announcement>(
            "SELECT id, message, expiration, start FROM announcements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_one(&self, record: NewAnnouncement) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            "INSERT INTO announcements (message, expiration, start)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&record.message)
        .bind(&record.expiration)
        .bind(&record.start)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_one(&self, id: &str, update: &AnnouncementUpdate) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE announcements
             SET message = COALESCE($1, message),
                 expiration = COALESCE($2, expiration),
                 start = COALESCE($3, start)
             WHERE id = $4",
        )
        .bind(&update.message)
        .bind(&update.expiration)
        .bind(&update.start)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, before: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(PURGE_EXPIRED_SQL)
            .bind(before)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM announcements")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_comparisons_use_byte_order() {
        assert!(FIND_CURRENT_SQL.contains(r#"expiration COLLATE "C" > $1 COLLATE "C""#));
        assert!(PURGE_EXPIRED_SQL.contains(r#"expiration COLLATE "C" <= $1 COLLATE "C""#));
    }

    #[test]
    fn migration_declares_byte_order_expiration() {
        let migration = include_str!("../../migrations/20240101000000_announcements.sql");
        assert!(migration.contains(r#"expiration TEXT COLLATE "C" NOT NULL"#));
    }
}
