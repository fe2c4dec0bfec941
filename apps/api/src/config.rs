use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::analysis::RetryPolicy;
use crate::ingest::validation::UploadPolicy;
use crate::llm_client::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    /// `production` hides diagnostic error detail from API responses.
    pub app_env: String,
    pub upload_dir: PathBuf,
    pub max_text_length: usize,
    pub max_upload_bytes: u64,
    pub allowed_mime_types: Vec<String>,
    pub ai_max_attempts: u32,
    pub ai_timeout: Duration,
    pub ai_backoff_base: Duration,
    pub ocr_max_pages: Option<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("resume-uploads")),
            max_text_length: parse_env("MAX_TEXT_LENGTH", 10_000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            allowed_mime_types: std::env::var("ALLOWED_MIME_TYPES")
                .map(|raw| parse_mime_list(&raw))
                .unwrap_or_else(|_| vec!["application/pdf".to_string()]),
            ai_max_attempts: parse_env("AI_MAX_ATTEMPTS", 3)?,
            ai_timeout: Duration::from_secs(parse_env("AI_TIMEOUT_SECS", 20)?),
            ai_backoff_base: Duration::from_secs(parse_env("AI_BACKOFF_BASE_SECS", 5)?),
            ocr_max_pages: std::env::var("OCR_MAX_PAGES")
                .ok()
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("OCR_MAX_PAGES must be a positive integer")?,
        };

        ensure!(config.ai_max_attempts >= 1, "AI_MAX_ATTEMPTS must be at least 1");
        ensure!(config.max_text_length > 0, "MAX_TEXT_LENGTH must be positive");
        ensure!(
            !config.allowed_mime_types.is_empty(),
            "ALLOWED_MIME_TYPES must list at least one type"
        );

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_mime_types: self.allowed_mime_types.clone(),
            max_bytes: self.max_upload_bytes,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.ai_max_attempts,
            backoff_base: self.ai_backoff_base,
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
            timeout: self.ai_timeout,
        }
    }

    #[cfg(test)]
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Config {
            database_url: "postgres://localhost/resume_test".to_string(),
            s3_bucket: "resumes-test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            gemini_api_key: "test-key".to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            app_env: "development".to_string(),
            upload_dir,
            max_text_length: 10_000,
            max_upload_bytes: 5 * 1024 * 1024,
            allowed_mime_types: vec!["application/pdf".to_string()],
            ai_max_attempts: 3,
            ai_timeout: Duration::from_secs(20),
            ai_backoff_base: Duration::from_secs(5),
            ocr_max_pages: None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    T: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number (default {default})")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated MIME allow-list, dropping blanks.
fn parse_mime_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mime_list_trims_and_lowercases() {
        assert_eq!(
            parse_mime_list(" application/PDF, ,image/png "),
            vec!["application/pdf".to_string(), "image/png".to_string()]
        );
    }

    #[test]
    fn test_production_detection_is_case_insensitive() {
        let mut config = Config::for_tests(std::env::temp_dir());
        assert!(!config.is_production());
        config.app_env = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_policies_follow_config_values() {
        let config = Config::for_tests(std::env::temp_dir());
        let retry = config.retry_policy();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.backoff_base, Duration::from_secs(5));
        assert_eq!(config.upload_policy().max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.llm_config().timeout, Duration::from_secs(20));
    }
}
