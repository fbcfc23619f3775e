use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::teacher::Teacher,
    store::{StoreError, TeacherDirectory},
};

/// `teachers` table, managed outside this service.
#[derive(Clone)]
pub struct PgTeacherDirectory {
    pool: PgPool,
}

impl PgTeacherDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherDirectory for PgTeacherDirectory {
    async fn find_one(&self, username: &str) -> Result<Option<Teacher>, StoreError> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT username, display_name FROM teachers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(teacher)
    }
}
