//! # Unified Application Configuration
//!
//! This module provides a centralized configuration system that consolidates
//! all application settings into a single, structured configuration object.
//! It supports loading from environment variables, validation, and provides
//! a clean interface for accessing configuration throughout the application.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Default maximum accepted upload size (16 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Cleanup policy applied by storage sweeps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Delete every file in the upload directory
    All,
    /// Delete only files older than the given number of minutes
    OlderThanMinutes(u64),
}

/// Field-naming variant used by the JSON and XML exporters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// Short keys: `text`, `timestamp`
    Compact,
    /// Long keys: `extracted_text`, `processed_at`, plus file metadata
    Verbose,
}

/// Page layout variant used by the PDF exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfLayout {
    /// Text only, starting at the top margin
    Plain,
    /// Filename/timestamp header block above the text
    Headed,
}

/// Storage and upload configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where uploaded and captured images are stored
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Extensions accepted at upload time
    pub upload_extensions: Vec<String>,
    /// Extensions accepted by validation before OCR
    pub ocr_extensions: Vec<String>,
    /// Cleanup policy for storage sweeps
    pub cleanup: CleanupPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_extensions: ["png", "jpg", "jpeg", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ocr_extensions: ["png", "jpg", "jpeg", "bmp", "tiff", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cleanup: CleanupPolicy::OlderThanMinutes(60),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.upload_dir.trim().is_empty() {
            return Err(AppError::Config(
                "Upload directory cannot be empty".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(AppError::Config(
                "Max upload size cannot be 0".to_string(),
            ));
        }

        if self.upload_extensions.is_empty() {
            return Err(AppError::Config(
                "Upload extension allow-set cannot be empty".to_string(),
            ));
        }

        if self.ocr_extensions.is_empty() {
            return Err(AppError::Config(
                "OCR extension allow-set cannot be empty".to_string(),
            ));
        }

        for ext in self.upload_extensions.iter().chain(&self.ocr_extensions) {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(AppError::Config(format!(
                    "Extension '{}' must be non-empty and written without a leading dot",
                    ext
                )));
            }
        }

        Ok(())
    }
}

/// OCR engine configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code (e.g. "eng", "eng+fra")
    pub language: String,
    /// Maximum wall-clock time for one recognition pass, in seconds
    pub timeout_secs: u64,
    /// Maximum width/height applied when shrinking working copies
    pub max_dimension: u32,
    /// Filesystem path to tessdata; `None` uses the TESSDATA_PREFIX default
    pub tessdata_path: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            timeout_secs: 30,
            max_dimension: 1200,
            tessdata_path: None,
        }
    }
}

impl OcrConfig {
    /// Validate OCR configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.language.trim().is_empty() {
            return Err(AppError::Config(
                "OCR language cannot be empty".to_string(),
            ));
        }

        if !self
            .language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+')
        {
            return Err(AppError::Config(format!(
                "OCR language '{}' contains invalid characters",
                self.language
            )));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config("OCR timeout cannot be 0".to_string()));
        }

        if self.timeout_secs > 300 {
            return Err(AppError::Config(
                "OCR timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        if self.max_dimension < 100 {
            return Err(AppError::Config(
                "Max dimension cannot be less than 100 pixels".to_string(),
            ));
        }

        if self.max_dimension > 10_000 {
            return Err(AppError::Config(
                "Max dimension cannot be greater than 10000 pixels".to_string(),
            ));
        }

        Ok(())
    }
}

/// Export layer configuration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Field-naming variant for JSON/XML exports
    pub field_naming: FieldNaming,
    /// Page layout variant for PDF exports
    pub pdf_layout: PdfLayout,
}

impl Default for FieldNaming {
    fn default() -> Self {
        FieldNaming::Compact
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        PdfLayout::Plain
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Storage and upload configuration
    pub storage: StorageConfig,
    /// OCR engine configuration
    pub ocr: OcrConfig,
    /// Export layer configuration
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        // Load storage configuration
        if let Ok(dir) = env::var("TEXTGRAB_UPLOAD_DIR") {
            config.storage.upload_dir = dir;
        }
        config.storage.max_upload_bytes = env::var("TEXTGRAB_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("TEXTGRAB_MAX_UPLOAD_BYTES must be a valid number".to_string())
            })?;
        let cleanup_minutes: u64 = env::var("TEXTGRAB_CLEANUP_MAX_AGE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| {
                AppError::Config(
                    "TEXTGRAB_CLEANUP_MAX_AGE_MINUTES must be a valid number".to_string(),
                )
            })?;
        config.storage.cleanup = if cleanup_minutes == 0 {
            CleanupPolicy::All
        } else {
            CleanupPolicy::OlderThanMinutes(cleanup_minutes)
        };

        // Load OCR configuration
        if let Ok(language) = env::var("TEXTGRAB_OCR_LANGUAGE") {
            config.ocr.language = language;
        }
        config.ocr.timeout_secs = env::var("TEXTGRAB_OCR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("TEXTGRAB_OCR_TIMEOUT_SECS must be a valid number".to_string())
            })?;
        config.ocr.max_dimension = env::var("TEXTGRAB_MAX_DIMENSION")
            .unwrap_or_else(|_| "1200".to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("TEXTGRAB_MAX_DIMENSION must be a valid number".to_string())
            })?;

        // Load export configuration
        config.export.field_naming = match env::var("TEXTGRAB_FIELD_NAMING")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "compact" => FieldNaming::Compact,
            "verbose" => FieldNaming::Verbose,
            _ => {
                return Err(AppError::Config(
                    "TEXTGRAB_FIELD_NAMING must be 'compact' or 'verbose'".to_string(),
                ))
            }
        };
        config.export.pdf_layout = match env::var("TEXTGRAB_PDF_LAYOUT")
            .unwrap_or_else(|_| "plain".to_string())
            .to_lowercase()
            .as_str()
        {
            "plain" => PdfLayout::Plain,
            "headed" => PdfLayout::Headed,
            _ => {
                return Err(AppError::Config(
                    "TEXTGRAB_PDF_LAYOUT must be 'plain' or 'headed'".to_string(),
                ))
            }
        };

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.storage.validate()?;
        self.ocr.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: upload_dir={}, max_upload_bytes={}, ocr_language={}, ocr_timeout_secs={}, max_dimension={}, field_naming={:?}, pdf_layout={:?}, cleanup={:?}",
            self.storage.upload_dir,
            self.storage.max_upload_bytes,
            self.ocr.language,
            self.ocr.timeout_secs,
            self.ocr.max_dimension,
            self.export.field_naming,
            self.export.pdf_layout,
            self.storage.cleanup
        )
    }
}
