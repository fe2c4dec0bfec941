use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{Resume, ResumeRow};
use crate::store::{ResumeStore, StoreError};

/// `resumes` table store. `parsed_data` is a JSONB column holding `ParsedData`.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, resume: &Resume) -> Result<Uuid, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO resumes (id, user_id, filename, file_path, uploaded_at, parsed_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(resume.id)
        .bind(resume.user_id)
        .bind(&resume.filename)
        .bind(&resume.file_path)
        .bind(resume.uploaded_at)
        .bind(Json(&resume.parsed_data))
        .execute(&self.pool)
        .await?;

        info!("Inserted resume {} for user {}", resume.id, resume.user_id);
        Ok(resume.id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Resume, StoreError> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Resume::from)
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Resume>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Resume::from).collect())
    }
}
