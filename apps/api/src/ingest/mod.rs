//! Resume ingestion: upload validation, text extraction with OCR fallback and
//! the orchestrator that ties them to analysis and persistence.

pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod validation;
