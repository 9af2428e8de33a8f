//! Image file validation
//!
//! Confirms a file is a genuine, decodable image of an allowed format
//! before any processing proceeds. Validation performs a real decode
//! pass over the bytes rather than a magic-byte sniff, so a renamed
//! non-image file is rejected instead of reaching the OCR engine.

use std::fs;
use std::path::Path;

use crate::errors::{AppError, AppResult};

/// Validates that a file exists, carries an allowed extension, and decodes as an image.
///
/// The allow-set is caller-supplied because upload acceptance and
/// validation-before-OCR historically use slightly different sets.
///
/// # Arguments
/// * `path` - Path of the file to validate
/// * `allowed_extensions` - Lowercase extensions accepted at this call site, without dots
///
/// # Returns
/// * `Ok(())` - The file is a decodable image with an allowed extension
/// * `Err(AppError::Validation)` - Reason is one of `"not found"`,
///   `"extension not allowed"`, or `"corrupt or unreadable"`
pub fn validate_image_file(path: &Path, allowed_extensions: &[String]) -> AppResult<()> {
    if !path.exists() {
        return Err(AppError::Validation("not found".to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(AppError::Validation("extension not allowed".to_string()));
    }

    let bytes =
        fs::read(path).map_err(|_| AppError::Validation("corrupt or unreadable".to_string()))?;
    image::load_from_memory(&bytes)
        .map_err(|_| AppError::Validation("corrupt or unreadable".to_string()))?;

    Ok(())
}
