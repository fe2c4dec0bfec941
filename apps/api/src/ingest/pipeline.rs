//! Upload Orchestrator — the single entry point for "submit resume for analysis".
//!
//! Flow: identity → file → normalize temp path → validate → read + extract →
//!       bound text → AI analysis → archive document → persist record.
//!
//! The transient upload is a `NamedTempFile` owned by `submit`. It is deleted
//! when that handle drops, so every early return (and a dropped request future)
//! releases it. Analysis never aborts the upload; a degraded outcome is stored.

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::ResumeAnalyzer;
use crate::archive::{resume_object_key, DocumentArchive};
use crate::auth::AuthUser;
use crate::errors::{AppError, PROCESSING_FAILED_MESSAGE};
use crate::ingest::extract::{
    strip_nul, ExtractedText, Extraction, ExtractionError, TextExtractor,
};
use crate::ingest::validation::{validate_upload, UploadPolicy};
use crate::models::resume::{AiAnalysis, ParsedData, Resume};
use crate::store::ResumeStore;

const DEFAULT_FILENAME: &str = "resume.pdf";

/// An upload staged on local disk for the duration of one request.
#[derive(Debug)]
pub struct UploadedFile {
    pub temp: NamedTempFile,
    pub original_filename: String,
    pub mime_type: String,
    pub size: u64,
}

impl UploadedFile {
    /// Writes `bytes` to a uniquely named file in `upload_dir`.
    pub async fn stage(
        upload_dir: &Path,
        bytes: &[u8],
        original_filename: &str,
        mime_type: &str,
    ) -> std::io::Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix(&format!("upload-{}-", Uuid::new_v4()))
            .suffix(".upload")
            .tempfile_in(upload_dir)?;
        tokio::fs::write(temp.path(), bytes).await?;

        Ok(Self {
            temp,
            original_filename: sanitize_filename(original_filename),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
        })
    }
}

/// Keeps only the final path component of a client-supplied filename.
fn sanitize_filename(name: &str) -> String {
    strip_nul(name)
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}

#[derive(Clone)]
pub struct UploadPipeline {
    policy: UploadPolicy,
    extractor: TextExtractor,
    analyzer: ResumeAnalyzer,
    store: Arc<dyn ResumeStore>,
    archive: Arc<dyn DocumentArchive>,
    max_text_length: usize,
    expose_error_details: bool,
}

impl UploadPipeline {
    pub fn new(
        policy: UploadPolicy,
        extractor: TextExtractor,
        analyzer: ResumeAnalyzer,
        store: Arc<dyn ResumeStore>,
        archive: Arc<dyn DocumentArchive>,
        max_text_length: usize,
        expose_error_details: bool,
    ) -> Self {
        Self {
            policy,
            extractor,
            analyzer,
            store,
            archive,
            max_text_length,
            expose_error_details,
        }
    }

    pub async fn submit(
        &self,
        user: Option<AuthUser>,
        file: Option<UploadedFile>,
    ) -> Result<Resume, AppError> {
        let user = user.ok_or(AppError::Unauthorized)?;
        let file = file.ok_or_else(|| AppError::bad_request("No file uploaded"))?;
        let UploadedFile {
            temp,
            original_filename,
            mime_type,
            size,
        } = file;

        let path = tokio::fs::canonicalize(temp.path()).await.map_err(|e| {
            error!("Cannot resolve staged upload {}: {e}", temp.path().display());
            self.processing_failed(&e)
        })?;

        if let Err(rejection) = validate_upload(&mime_type, size, &self.policy) {
            warn!(
                "Rejected upload '{original_filename}' ({mime_type}, {size} bytes) from user {}: {rejection}",
                user.user_id
            );
            return Err(AppError::BadRequest {
                message: PROCESSING_FAILED_MESSAGE.to_string(),
                details: self.expose_error_details.then(|| rejection.to_string()),
            });
        }

        let (bytes, extraction) = self.read_and_extract(&path).await.map_err(|e| {
            error!("Text extraction failed for '{original_filename}': {e}");
            self.processing_failed(&e)
        })?;

        let extracted = ExtractedText::bounded(&extraction.text, self.max_text_length);
        debug!(
            "Extracted resume text via {:?} ({} chars): {}",
            extraction.method, extracted.length, extracted.preview
        );

        let outcome = self.analyzer.analyze(&extracted.text).await;
        let ai_analysis = AiAnalysis {
            outcome,
            analyzed_at: Utc::now(),
        };

        let resume_id = Uuid::new_v4();
        let key = resume_object_key(user.user_id, resume_id);
        let file_path = self
            .archive
            .put(&key, bytes, &mime_type)
            .await
            .map_err(|e| {
                error!("Failed to archive document for resume {resume_id}: {e}");
                self.persistence_failed(&e)
            })?;

        let resume = Resume {
            id: resume_id,
            user_id: user.user_id,
            filename: original_filename,
            file_path,
            uploaded_at: Utc::now(),
            parsed_data: ParsedData {
                raw_text: extracted.text,
                preview: extracted.preview,
                length: extracted.length,
                ai_analysis,
            },
        };

        if let Err(e) = self.store.create(&resume).await {
            error!("Failed to persist resume {resume_id}: {e}");
            if let Err(cleanup) = self.archive.remove(&key).await {
                warn!("Failed to remove archived document {key}: {cleanup}");
            }
            return Err(self.persistence_failed(&e));
        }

        if let Err(e) = temp.close() {
            warn!("Failed to delete staged upload {}: {e}", path.display());
        }

        info!(
            "Stored resume {} for user {} (analysis {})",
            resume.id,
            resume.user_id,
            if resume.parsed_data.ai_analysis.outcome.is_degraded() {
                "degraded"
            } else {
                "complete"
            }
        );
        Ok(resume)
    }

    async fn read_and_extract(&self, path: &Path) -> Result<(Bytes, Extraction), ExtractionError> {
        let bytes = Bytes::from(tokio::fs::read(path).await?);
        let extraction = self.extractor.extract(&bytes).await?;
        Ok((bytes, extraction))
    }

    fn processing_failed(&self, err: &dyn Display) -> AppError {
        AppError::ProcessingFailed {
            details: self.expose_error_details.then(|| err.to_string()),
        }
    }

    fn persistence_failed(&self, err: &dyn Display) -> AppError {
        AppError::PersistenceFailed {
            details: self.expose_error_details.then(|| err.to_string()),
        }
    }
}
