use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::resume::Resume;
use crate::store::{ResumeStore, StoreError};

/// Vec-backed store for tests. `failing()` rejects every write.
#[derive(Default)]
pub struct InMemoryResumeStore {
    records: Mutex<Vec<Resume>>,
    reject_writes: AtomicBool,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.reject_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Resume> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn create(&self, resume: &Resume) -> Result<Uuid, StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.records.lock().unwrap().push(resume.clone());
        Ok(resume.id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Resume, StoreError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Resume>, StoreError> {
        let mut owned: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(owned)
    }
}
