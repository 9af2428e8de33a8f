//! # JSON Export Module
//!
//! Serializes extraction output with `serde_json`. The two field-naming
//! variants are separate serialize-only structs so the emitted key order
//! always follows the declared shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::FieldNaming;
use crate::errors::{AppError, AppResult};
use crate::storage::FileInfo;
use crate::text;

#[derive(Serialize)]
struct CompactDocument<'a> {
    filename: &'a str,
    text: &'a str,
    character_count: usize,
    word_count: usize,
    line_count: usize,
    timestamp: String,
}

#[derive(Serialize)]
struct VerboseDocument<'a> {
    filename: &'a str,
    extracted_text: &'a str,
    processed_at: String,
    character_count: usize,
    word_count: usize,
    line_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_info: Option<&'a FileInfo>,
}

/// Renders pretty-printed UTF-8 JSON in the configured field naming.
///
/// `file_info` appears only in the verbose variant, and only when the
/// caller supplies it.
pub fn render(
    text_content: &str,
    filename: &str,
    processed_at: DateTime<Utc>,
    naming: FieldNaming,
    file_info: Option<&FileInfo>,
) -> AppResult<Vec<u8>> {
    let counts = text::counts(text_content);
    let result = match naming {
        FieldNaming::Compact => serde_json::to_vec_pretty(&CompactDocument {
            filename,
            text: text_content,
            character_count: counts.characters,
            word_count: counts.words,
            line_count: counts.lines,
            timestamp: processed_at.to_rfc3339(),
        }),
        FieldNaming::Verbose => serde_json::to_vec_pretty(&VerboseDocument {
            filename,
            extracted_text: text_content,
            processed_at: processed_at.to_rfc3339(),
            character_count: counts.characters,
            word_count: counts.words,
            line_count: counts.lines,
            file_info,
        }),
    };
    result.map_err(|e| AppError::Export(format!("Failed to serialize JSON export: {}", e)))
}
