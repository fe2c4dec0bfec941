//! Text Extractor — native PDF text layer first, OCR only when the layer is too thin.
//!
//! Scanned resumes carry no (or almost no) text layer. Anything under
//! `MIN_TEXT_SIGNAL` trimmed characters is treated as scanned and sent to OCR once.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::ocr::OcrEngine;

/// Minimum trimmed text-layer length that skips OCR.
pub const MIN_TEXT_SIGNAL: usize = 50;
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read uploaded document: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Native text-layer reader.
#[async_trait]
pub trait TextLayer: Send + Sync {
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

/// `pdf-extract` on the blocking pool. Parser panics on hostile input surface
/// as `ExtractionError::Pdf` through the join error.
pub struct PdfTextLayer;

#[async_trait]
impl TextLayer for PdfTextLayer {
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let bytes = pdf.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Pdf(format!("extractor aborted: {e}")))?
            .map_err(|e| ExtractionError::Pdf(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    TextLayer,
    Ocr,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub method: ExtractionMethod,
}

#[derive(Clone)]
pub struct TextExtractor {
    text_layer: Arc<dyn TextLayer>,
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(text_layer: Arc<dyn TextLayer>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { text_layer, ocr }
    }

    pub async fn extract(&self, pdf: &[u8]) -> Result<Extraction, ExtractionError> {
        let native = self.text_layer.extract(pdf).await?;
        let signal = native.trim().chars().count();

        if signal >= MIN_TEXT_SIGNAL {
            info!("Extracted {signal} characters from the PDF text layer");
            return Ok(Extraction {
                text: native,
                method: ExtractionMethod::TextLayer,
            });
        }

        warn!("PDF text layer yielded {signal} characters (< {MIN_TEXT_SIGNAL}); falling back to OCR");
        let text = self.ocr.recognize(pdf).await?;
        info!("OCR recognized {} characters", text.trim().chars().count());

        Ok(Extraction {
            text,
            method: ExtractionMethod::Ocr,
        })
    }
}

/// Extracted resume text bounded to the configured maximum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub preview: String,
    /// Characters in `text`; never above the bound.
    pub length: usize,
}

impl ExtractedText {
    /// NUL characters are dropped first: Postgres JSONB rejects `\u0000`.
    pub fn bounded(raw: &str, max_text_length: usize) -> Self {
        let cleaned = strip_nul(raw);
        let text = truncate_chars(&cleaned, max_text_length).to_string();
        let preview = match text.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.clone(),
        };
        let length = text.chars().count();
        Self {
            text,
            preview,
            length,
        }
    }
}

/// Removes NUL characters, borrowing when there are none.
pub fn strip_nul(s: &str) -> Cow<'_, str> {
    if s.contains('\0') {
        Cow::Owned(s.replace('\0', ""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Returns the first `max_chars` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
