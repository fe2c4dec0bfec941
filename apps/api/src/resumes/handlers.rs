//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::ingest::pipeline::UploadedFile;
use crate::models::resume::Resume;
use crate::state::AppState;

/// Multipart field carrying the document.
pub const UPLOAD_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub resume: Resume,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub success: bool,
    pub data: Resume,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub resumes: Vec<Resume>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Stages the `resume` multipart field to disk and runs the upload pipeline.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    if user.is_none() {
        return Err(AppError::Unauthorized);
    }

    let file = stage_resume_field(multipart, &state).await?;
    let resume = state.pipeline.submit(user, file).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            resume,
        }),
    ))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeResponse>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid resume ID format"))?;
    let resume = state.store.find_by_id(id).await?;
    Ok(Json(ResumeResponse {
        success: true,
        data: resume,
    }))
}

/// GET /api/v1/resumes/user/:user_id
pub async fn handle_list_user_resumes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| AppError::bad_request("Invalid User ID format"))?;

    let resumes = state.store.find_by_owner(user_id).await?;
    if resumes.is_empty() {
        return Err(AppError::NotFound(
            "No resumes found for this user".to_string(),
        ));
    }

    Ok(Json(ResumeListResponse {
        success: true,
        resumes,
    }))
}

/// Returns the staged `resume` field, or `None` when the form has no such field.
async fn stage_resume_field(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;

        info!(
            "Received upload '{filename}' ({mime_type}, {} bytes)",
            data.len()
        );

        let staged = UploadedFile::stage(&state.config.upload_dir, &data, &filename, &mime_type)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to stage upload: {e}")))?;
        return Ok(Some(staged));
    }

    Ok(None)
}
