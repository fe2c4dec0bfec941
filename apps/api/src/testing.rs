//! Test doubles shared by the pipeline, analysis and route tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use crate::archive::{ArchiveError, DocumentArchive};
use crate::ingest::extract::{ExtractionError, TextLayer};
use crate::ingest::ocr::OcrEngine;
use crate::llm_client::{LlmError, TextGenerator};

pub fn valid_analysis_json() -> String {
    json!({
        "skills": {
            "technical": ["Rust", "PostgreSQL", "Kubernetes"],
            "soft_skills": ["Mentoring", "Communication"]
        },
        "experience": {
            "total_years": 8,
            "positions": ["Senior Software Engineer", "Software Engineer"],
            "industries": ["Fintech"],
            "notable_projects": ["Payments ledger rewrite"],
            "career_level": "Senior"
        },
        "education": ["BSc Computer Science"],
        "certifications": [],
        "leadership_roles": ["Tech lead for platform team"],
        "missing_keywords": ["gRPC", "Terraform"],
        "resume_quality_score": 8,
        "job_match_percentage": 72,
        "actionable_improvements": ["Quantify impact of the ledger rewrite"],
        "missing_sections": ["Projects"],
        "summary": "Senior backend engineer focused on reliable distributed systems."
    })
    .to_string()
}

/// Replays queued responses in order; an empty queue answers with `EmptyContent`.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

enum LayerReply {
    Text(String),
    ParseError,
    ReadError,
}

/// Text layer returning fixed text (or an error) and counting calls.
pub struct StaticTextLayer {
    reply: LayerReply,
    calls: AtomicUsize,
}

impl StaticTextLayer {
    pub fn new(text: &str) -> Self {
        Self::with(LayerReply::Text(text.to_string()))
    }

    /// Fails as a corrupt PDF would.
    pub fn failing() -> Self {
        Self::with(LayerReply::ParseError)
    }

    /// Fails as an unreadable file on disk would.
    pub fn unreadable() -> Self {
        Self::with(LayerReply::ReadError)
    }

    fn with(reply: LayerReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextLayer for StaticTextLayer {
    async fn extract(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            LayerReply::Text(text) => Ok(text.clone()),
            LayerReply::ParseError => Err(ExtractionError::Pdf(
                "invalid cross-reference table".to_string(),
            )),
            LayerReply::ReadError => Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            ))),
        }
    }
}

pub struct CountingOcr {
    text: Option<String>,
    calls: AtomicUsize,
}

impl CountingOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for CountingOcr {
    async fn recognize(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| ExtractionError::Ocr("tesseract exited with 1".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryArchive {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryArchive {
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl DocumentArchive for MemoryArchive {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<String, ArchiveError> {
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(format!("memory://{key}"))
    }

    async fn remove(&self, key: &str) -> Result<(), ArchiveError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
