//! # Extraction Pipeline Module
//!
//! Drives one stored file through the full OCR flow: validate, shrink
//! oversized images, preprocess into a binarized working copy, recognize
//! with a timeout, normalize, and record the outcome in the
//! [`ExtractionStore`]. The working copy is removed when the pipeline
//! finishes, whatever the outcome.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::extraction::{ExtractionResult, ExtractionStore};
use crate::ocr::{self, TextRecognizer};
use crate::preprocessing;
use crate::storage::LocalStorage;
use crate::text;
use crate::validation::validate_image_file;

/// Runs the extraction pipeline for one stored file.
///
/// Validation happens before the store records anything, so a request
/// for a missing or non-image file leaves no trace. From `begin`
/// onward every outcome lands in the store: success as `completed`
/// with normalized text, any stage failure as `failed` with the error
/// message.
///
/// # Arguments
/// * `storage` - Store holding the input file
/// * `store` - Registry receiving the lifecycle updates
/// * `recognizer` - OCR backend to run
/// * `config` - Application configuration
/// * `filename` - Stored name of the file to process
pub async fn extract(
    storage: &LocalStorage,
    store: &ExtractionStore,
    recognizer: Arc<dyn TextRecognizer>,
    config: &AppConfig,
    filename: &str,
) -> AppResult<ExtractionResult> {
    let path = storage.path_of(filename)?;
    validate_image_file(&path, &config.storage.ocr_extensions)?;

    store.begin(filename);
    let started = Instant::now();

    match run_stages(recognizer, config, &path).await {
        Ok(raw_text) => {
            let normalized = text::normalize(&raw_text);
            store.complete(filename, &normalized);
            info!(
                filename = %filename,
                characters = normalized.chars().count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Extraction completed"
            );
            store.get(filename).ok_or_else(|| {
                AppError::Internal(format!("Extraction record missing for '{}'", filename))
            })
        }
        Err(err) => {
            store.fail(filename, &err.to_string());
            error_logging::log_ocr_error(&err, "extract", Some(filename), Some(started.elapsed()));
            Err(err)
        }
    }
}

/// Shrink, preprocess, and recognize. The preprocessing guard drops
/// here, removing the derived working copy once recognition is done.
async fn run_stages(
    recognizer: Arc<dyn TextRecognizer>,
    config: &AppConfig,
    path: &Path,
) -> AppResult<String> {
    let shrink = preprocessing::shrink_to_bounds(
        path,
        config.ocr.max_dimension,
        config.ocr.max_dimension,
    )?;
    if shrink.resized {
        debug!(
            original = ?shrink.original_dimensions,
            resized = ?shrink.final_dimensions,
            "Image shrunk before OCR"
        );
    }

    let guard = preprocessing::preprocess_for_ocr(path)?;
    let recognized = ocr::recognize_with_timeout(
        recognizer,
        guard.path().to_path_buf(),
        &config.ocr.language,
        Duration::from_secs(config.ocr.timeout_secs),
    )
    .await?;
    Ok(recognized)
}
