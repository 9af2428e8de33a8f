//! # Shared Types for Image Preprocessing
//!
//! This module contains the shared types, structs, and enums used across
//! the preprocessing sub-modules.

use image::DynamicImage;

/// Errors that can occur during image preprocessing operations.
#[derive(Debug, Clone)]
pub enum PreprocessingError {
    /// Invalid resize bounds specified
    InvalidBounds { width: u32, height: u32 },
    /// Image processing operation failed
    ProcessingFailed { message: String },
    /// Failed to load or decode image
    ImageLoad { message: String },
}

impl std::fmt::Display for PreprocessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessingError::InvalidBounds { width, height } => {
                write!(
                    f,
                    "Invalid resize bounds: {}x{}. Both dimensions must be greater than zero",
                    width, height
                )
            }
            PreprocessingError::ProcessingFailed { message } => {
                write!(f, "Image processing failed: {}", message)
            }
            PreprocessingError::ImageLoad { message } => {
                write!(f, "Failed to load image: {}", message)
            }
        }
    }
}

impl std::error::Error for PreprocessingError {}

/// Result of image noise reduction operation.
#[derive(Debug, Clone)]
pub struct DenoisedImageResult {
    /// The denoised image
    pub image: DynamicImage,
    /// Sigma value used for Gaussian blur
    pub sigma: f32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of image thresholding operation.
#[derive(Debug, Clone)]
pub struct ThresholdedImageResult {
    /// The thresholded binary image
    pub image: DynamicImage,
    /// Optimal threshold value found by Otsu's method
    pub threshold: u8,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of morphological dilation on a binary image.
#[derive(Debug, Clone)]
pub struct DilatedImageResult {
    /// The dilated image
    pub image: DynamicImage,
    /// Kernel size used (2 for the 2x2 structuring element)
    pub kernel_size: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of a bounded shrink operation.
#[derive(Debug, Clone)]
pub struct ShrinkResult {
    /// Whether the image was actually resized
    pub resized: bool,
    /// Dimensions before the operation (width, height)
    pub original_dimensions: (u32, u32),
    /// Dimensions after the operation (width, height)
    pub final_dimensions: (u32, u32),
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}
