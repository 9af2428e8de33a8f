//! # Ingest Module
//!
//! Entry points for getting image bytes into storage: multipart-style
//! uploads carrying raw bytes plus an original filename, and camera
//! captures arriving as base64 data URLs. Both enforce the size cap and
//! hand the bytes to [`LocalStorage`] under a generated name.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use crate::config::StorageConfig;
use crate::errors::{AppError, AppResult};
use crate::storage::{LocalStorage, NamePattern};

/// Accepts an uploaded file and returns its stored name.
///
/// Rejects empty payloads, payloads over `max_upload_bytes`, and
/// filenames whose extension is missing or not in the upload allow
/// list. The stored name carries a random hex prefix so repeated
/// uploads of the same file never collide.
pub fn accept_upload(
    storage: &LocalStorage,
    config: &StorageConfig,
    bytes: &[u8],
    original_filename: &str,
) -> AppResult<String> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if bytes.len() as u64 > config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "Upload exceeds maximum size of {} bytes",
            config.max_upload_bytes
        )));
    }

    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Filename '{}' has no extension",
                original_filename
            ))
        })?;
    if !config
        .upload_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(AppError::Validation(format!(
            "File extension '{}' not allowed",
            extension
        )));
    }

    let filename = storage.save(bytes, original_filename, NamePattern::Prefixed)?;
    info!(
        original = %original_filename,
        stored = %filename,
        size_bytes = bytes.len(),
        "Upload accepted"
    );
    Ok(filename)
}

/// Accepts a camera capture as a base64 data URL and returns its
/// stored name.
///
/// Everything up to and including the first comma is treated as the
/// data URL header and discarded; a payload without a comma is decoded
/// as-is. Captures are stored under a timestamped name derived from
/// `capture.jpg`.
pub fn accept_capture(
    storage: &LocalStorage,
    config: &StorageConfig,
    data_url: &str,
) -> AppResult<String> {
    let payload = match data_url.split_once(',') {
        Some((_, rest)) => rest,
        None => data_url,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::Validation(format!("Invalid base64 image data: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Captured image is empty".to_string()));
    }
    if bytes.len() as u64 > config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "Upload exceeds maximum size of {} bytes",
            config.max_upload_bytes
        )));
    }

    let filename = storage.save(&bytes, "capture.jpg", NamePattern::Stamped)?;
    info!(
        stored = %filename,
        size_bytes = bytes.len(),
        "Capture accepted"
    );
    Ok(filename)
}
