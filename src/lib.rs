//! # textgrab
//!
//! Image-to-text extraction service core: validates and preprocesses
//! uploaded or captured images, runs OCR behind a pluggable engine with
//! a bounded timeout, and exports the recognized text as PDF, JSON, or
//! XML documents.

pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod ingest;
pub mod ocr;
pub mod ocr_errors;
pub mod pipeline;
pub mod preprocessing;
pub mod storage;
pub mod text;
pub mod validation;

// Re-export types for easier access
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
pub use extraction::{ExtractionResult, ExtractionStatus, ExtractionStore};
pub use ocr::{TesseractBackend, TextRecognizer};
pub use ocr_errors::{OcrError, OCR_FAILURE_PLACEHOLDER};
pub use storage::LocalStorage;
