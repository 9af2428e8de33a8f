//! # Image Preprocessing Module
//!
//! This module prepares images for OCR. The fixed pipeline is
//! grayscale → Gaussian blur → Otsu binarization → 2x2 dilation, persisted
//! as a transient derived file that is removed once recognition finishes.
//! A separate bounded-shrink operation downsizes oversized working copies
//! in place.
//!
//! The module is organized into focused sub-modules:
//! - `thresholding`: Binary thresholding using Otsu's method
//! - `filtering`: Noise reduction and morphological dilation
//! - `types`: Shared types and error definitions

pub mod filtering;
pub mod thresholding;
pub mod types;

// Re-export commonly used types and functions for convenience
pub use types::{
    DenoisedImageResult, DilatedImageResult, PreprocessingError, ShrinkResult,
    ThresholdedImageResult,
};

pub use filtering::{apply_dilation, reduce_noise, GAUSSIAN_SIGMA};
pub use thresholding::apply_otsu_threshold;

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use tracing::{debug, warn};

/// Derived-file prefix for preprocessed copies
const DERIVED_PREFIX: &str = "processed_";

/// Transient handle to a preprocessed image.
///
/// Holds the path the OCR engine should read. When the handle is dropped
/// the derived file is removed from disk, unless preprocessing fell back
/// to the original path. The original image is never touched.
#[derive(Debug)]
pub struct PreprocessedImage {
    original: PathBuf,
    derived: PathBuf,
}

impl PreprocessedImage {
    /// Path the OCR engine should read
    pub fn path(&self) -> &Path {
        &self.derived
    }

    /// Whether a derived file was actually produced
    pub fn is_derived(&self) -> bool {
        self.derived != self.original
    }
}

impl Drop for PreprocessedImage {
    fn drop(&mut self) {
        if self.derived != self.original {
            if let Err(err) = std::fs::remove_file(&self.derived) {
                warn!(
                    path = %self.derived.display(),
                    error = %err,
                    "Failed to remove derived preprocessing artifact"
                );
            }
        }
    }
}

/// Runs the full preprocessing pipeline and persists a derived copy.
///
/// If the source image cannot be decoded, the original path is returned
/// unchanged so the OCR engine can still attempt the raw file; this is a
/// graceful fallback, not an error. On success the derived file sits next
/// to the source, named `processed_{filename}`, and lives only as long as
/// the returned handle.
pub fn preprocess_for_ocr(path: &Path) -> Result<PreprocessedImage, PreprocessingError> {
    let start_time = std::time::Instant::now();

    let source = match image::open(path) {
        Ok(img) => img,
        Err(err) => {
            debug!(
                target: "ocr_preprocessing",
                path = %path.display(),
                error = %err,
                "Image could not be decoded, passing original to OCR"
            );
            return Ok(PreprocessedImage {
                original: path.to_path_buf(),
                derived: path.to_path_buf(),
            });
        }
    };

    let gray = image::DynamicImage::ImageLuma8(source.to_luma8());
    let denoised = reduce_noise(&gray, GAUSSIAN_SIGMA)?;
    let thresholded = apply_otsu_threshold(&denoised.image)?;
    let dilated = apply_dilation(&thresholded.image)?;

    let derived = derived_path(path);
    dilated
        .image
        .save(&derived)
        .map_err(|err| PreprocessingError::ProcessingFailed {
            message: format!("Failed to save derived image {}: {}", derived.display(), err),
        })?;

    debug!(
        target: "ocr_preprocessing",
        "Preprocessing pipeline completed in {}ms: threshold={}, derived={}",
        start_time.elapsed().as_millis(),
        thresholded.threshold,
        derived.display()
    );

    Ok(PreprocessedImage {
        original: path.to_path_buf(),
        derived,
    })
}

/// Shrinks an image in place so neither dimension exceeds the given bounds.
///
/// Aspect ratio is preserved; the smaller of the two scale factors wins and
/// fractional target dimensions are truncated. Uses Lanczos3 resampling.
/// Lossy and irreversible, so callers apply it only to working copies,
/// never the canonical original.
pub fn shrink_to_bounds(
    path: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<ShrinkResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    if max_width == 0 || max_height == 0 {
        return Err(PreprocessingError::InvalidBounds {
            width: max_width,
            height: max_height,
        });
    }

    let source = image::open(path).map_err(|err| PreprocessingError::ImageLoad {
        message: format!("{}: {}", path.display(), err),
    })?;
    let (width, height) = (source.width(), source.height());

    if width <= max_width && height <= max_height {
        return Ok(ShrinkResult {
            resized: false,
            original_dimensions: (width, height),
            final_dimensions: (width, height),
            processing_time_ms: start_time.elapsed().as_millis() as u32,
        });
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = (width as f64 * ratio) as u32;
    let new_height = (height as f64 * ratio) as u32;

    let resized = source.resize_exact(new_width, new_height, FilterType::Lanczos3);
    resized
        .save(path)
        .map_err(|err| PreprocessingError::ProcessingFailed {
            message: format!("Failed to overwrite {}: {}", path.display(), err),
        })?;

    debug!(
        target: "ocr_preprocessing",
        "Shrunk image in {}ms: {}x{} -> {}x{}",
        start_time.elapsed().as_millis(),
        width,
        height,
        new_width,
        new_height
    );

    Ok(ShrinkResult {
        resized: true,
        original_dimensions: (width, height),
        final_dimensions: (new_width, new_height),
        processing_time_ms: start_time.elapsed().as_millis() as u32,
    })
}

fn derived_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    let derived_name = format!("{}{}", DERIVED_PREFIX, file_name);
    match path.parent() {
        Some(parent) => parent.join(derived_name),
        None => PathBuf::from(derived_name),
    }
}
