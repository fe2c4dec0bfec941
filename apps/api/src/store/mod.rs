//! Resume Record Store — the persistence contract the upload pipeline and
//! query routes depend on. `AppState` holds an `Arc<dyn ResumeStore>`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::Resume;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resume {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Each `create` is independent; no multi-record transactions are offered.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, resume: &Resume) -> Result<Uuid, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Resume, StoreError>;

    /// Newest upload first.
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Resume>, StoreError>;
}
