use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Which uploads the pipeline will look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Lowercase MIME types without parameters.
    pub allowed_mime_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: vec!["application/pdf".to_string()],
            max_bytes: 5 * MIB,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Unsupported file type '{mime_type}'. Allowed types: {allowed}")]
    UnsupportedType { mime_type: String, allowed: String },

    #[error("File size exceeds {}MB limit", megabytes(.limit))]
    TooLarge { size: u64, limit: u64 },
}

fn megabytes(bytes: &u64) -> String {
    if bytes % MIB == 0 {
        (bytes / MIB).to_string()
    } else {
        format!("{:.1}", *bytes as f64 / MIB as f64)
    }
}

/// Checks declared MIME type and size against the policy. Pure; never retried.
pub fn validate_upload(
    mime_type: &str,
    size: u64,
    policy: &UploadPolicy,
) -> Result<(), UploadRejection> {
    let essence = mime_essence(mime_type);
    if !policy.allowed_mime_types.iter().any(|m| *m == essence) {
        return Err(UploadRejection::UnsupportedType {
            mime_type: mime_type.to_string(),
            allowed: policy.allowed_mime_types.join(", "),
        });
    }

    if size > policy.max_bytes {
        return Err(UploadRejection::TooLarge {
            size,
            limit: policy.max_bytes,
        });
    }

    Ok(())
}

/// `Application/PDF; charset=binary` → `application/pdf`
fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
