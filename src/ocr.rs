//! # OCR Engine Module
//!
//! Wraps the OCR backend behind the [`TextRecognizer`] capability trait so
//! the pipeline can swap or mock the engine. The default backend drives
//! Tesseract through `leptess`, reusing one initialized instance per
//! language because initialization is expensive. Recognition runs on a
//! blocking worker under a bounded timeout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use leptess::LepTess;
use tracing::{debug, info};

use crate::ocr_errors::OcrError;

/// Capability trait for OCR backends.
///
/// `recognize` is a synchronous, potentially long-running call; use
/// [`recognize_with_timeout`] to run it off the async runtime with a
/// deadline.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes text in the image at `image_path` using the given
    /// Tesseract-style language code (e.g. `"eng"`).
    fn recognize(&self, image_path: &Path, language: &str) -> Result<String, OcrError>;
}

/// Tesseract-backed recognizer with per-language instance reuse.
pub struct TesseractBackend {
    tessdata_path: Option<String>,
    instances: Mutex<HashMap<String, Arc<Mutex<LepTess>>>>,
}

impl TesseractBackend {
    /// Creates a backend; `tessdata_path = None` uses the TESSDATA_PREFIX default.
    pub fn new(tessdata_path: Option<String>) -> Self {
        Self {
            tessdata_path,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached instance for a language, initializing it on first use.
    fn get_instance(&self, language: &str) -> Result<Arc<Mutex<LepTess>>, OcrError> {
        {
            let instances = self
                .instances
                .lock()
                .expect("Failed to acquire instances lock");
            if let Some(instance) = instances.get(language) {
                debug!(language = %language, "Reusing existing Tesseract instance");
                return Ok(Arc::clone(instance));
            }
        }

        info!(language = %language, "Initializing new Tesseract instance");
        let lep_tess = LepTess::new(self.tessdata_path.as_deref(), language).map_err(|e| {
            OcrError::Initialization(format!(
                "Failed to initialize Tesseract for language '{}': {}",
                language, e
            ))
        })?;

        let mut instances = self
            .instances
            .lock()
            .expect("Failed to acquire instances lock");
        let instance = instances
            .entry(language.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(lep_tess)));
        Ok(Arc::clone(instance))
    }
}

impl TextRecognizer for TesseractBackend {
    fn recognize(&self, image_path: &Path, language: &str) -> Result<String, OcrError> {
        let instance = self.get_instance(language)?;
        let mut tess = instance
            .lock()
            .expect("Failed to acquire Tesseract instance lock");

        tess.set_image(image_path)
            .map_err(|e| OcrError::ImageLoad(format!("Failed to load image for OCR: {}", e)))?;
        tess.get_utf8_text()
            .map_err(|e| OcrError::Extraction(format!("Failed to extract text from image: {}", e)))
    }
}

/// Runs recognition on a blocking worker thread under a bounded timeout.
///
/// Expiry surfaces as [`OcrError::Timeout`]. The worker itself is not
/// interruptible; after expiry it finishes in the background and its
/// result is discarded.
pub async fn recognize_with_timeout(
    recognizer: Arc<dyn TextRecognizer>,
    image_path: PathBuf,
    language: &str,
    timeout: Duration,
) -> Result<String, OcrError> {
    let language = language.to_string();
    let task = tokio::task::spawn_blocking(move || recognizer.recognize(&image_path, &language));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(OcrError::Extraction(format!(
            "OCR worker task failed: {}",
            join_err
        ))),
        Err(_) => Err(OcrError::Timeout(format!(
            "OCR operation timed out after {} seconds",
            timeout.as_secs()
        ))),
    }
}
