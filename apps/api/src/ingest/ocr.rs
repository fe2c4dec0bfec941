//! OCR fallback for scanned PDFs.
//!
//! `TesseractOcr` renders pages with Poppler's `pdftoppm` and recognizes each
//! page image with the `tesseract` CLI. Both binaries must be on `PATH`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::ingest::extract::ExtractionError;

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognizes the text of every rendered page of `pdf`, in page order.
    async fn recognize(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    dpi: u32,
    language: String,
    /// Last page to render; `None` renders the whole document.
    max_pages: Option<u32>,
}

impl TesseractOcr {
    pub fn new(max_pages: Option<u32>) -> Self {
        Self {
            dpi: 300,
            language: "eng".to_string(),
            max_pages,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("document.pdf");
        tokio::fs::write(&pdf_path, pdf).await?;

        let mut render = Command::new("pdftoppm");
        render.arg("-r").arg(self.dpi.to_string()).arg("-png");
        if let Some(last) = self.max_pages {
            render.arg("-l").arg(last.to_string());
        }
        render.arg(&pdf_path).arg(workdir.path().join("page"));
        run(render, "pdftoppm").await?;

        let pages = rendered_pages(workdir.path()).await?;
        if pages.is_empty() {
            return Err(ExtractionError::Ocr("pdftoppm rendered no pages".to_string()));
        }

        let mut text = String::new();
        for page in &pages {
            let mut recognize = Command::new("tesseract");
            recognize
                .arg(page)
                .arg("stdout")
                .arg("-l")
                .arg(&self.language);
            let stdout = run(recognize, "tesseract").await?;
            text.push_str(String::from_utf8_lossy(&stdout).trim_end());
            text.push('\n');
        }

        debug!("OCR processed {} page(s)", pages.len());
        Ok(text)
    }
}

/// Runs a child process to completion, returning stdout. The child is killed if
/// the request is dropped mid-flight.
async fn run(mut command: Command, program: &str) -> Result<Vec<u8>, ExtractionError> {
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ExtractionError::Ocr(format!("failed to launch {program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Ocr(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}

/// PNG pages written by `pdftoppm`, in page order. Page numbers are zero-padded
/// to a common width, so lexical order is page order.
async fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "png") {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}
