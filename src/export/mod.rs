//! # Export Module
//!
//! Turns one extraction result into a downloadable artifact. Every
//! exporter is a pure function from `(text, filename, processed_at)`
//! to bytes; format-specific layout lives in the submodules.

use chrono::{DateTime, Utc};

use crate::config::ExportConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::storage::FileInfo;

pub mod json;
pub mod pdf;
pub mod xml;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Json,
    Xml,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Json => "application/json",
            ExportFormat::Xml => "application/xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(AppError::Validation(format!(
                "Unknown export format '{}'",
                other
            ))),
        }
    }
}

/// In-memory export output with the headers a download response needs.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// `{source filename}.{format extension}`.
    pub download_name: String,
}

/// Renders extracted text into the requested format.
///
/// `file_info` only affects the verbose JSON variant; other formats
/// ignore it.
pub fn export(
    format: ExportFormat,
    config: &ExportConfig,
    text: &str,
    filename: &str,
    processed_at: DateTime<Utc>,
    file_info: Option<&FileInfo>,
) -> AppResult<ExportArtifact> {
    let rendered = match format {
        ExportFormat::Pdf => pdf::render(text, filename, processed_at, config.pdf_layout),
        ExportFormat::Json => {
            json::render(text, filename, processed_at, config.field_naming, file_info)
        }
        ExportFormat::Xml => xml::render(text, filename, processed_at, config.field_naming),
    };

    match rendered {
        Ok(bytes) => Ok(ExportArtifact {
            bytes,
            mime_type: format.mime_type(),
            download_name: format!("{}.{}", filename, format.extension()),
        }),
        Err(err) => {
            error_logging::log_export_error(&err, format.extension(), filename);
            Err(err)
        }
    }
}
