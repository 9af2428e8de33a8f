//! # Image Thresholding Module
//!
//! Binarization step of the OCR preprocessing pipeline. The threshold is
//! chosen automatically with Otsu's method so the same call works for
//! photographs, screenshots, and scans without per-image tuning.

use image::DynamicImage;
use tracing;

use super::types::{PreprocessingError, ThresholdedImageResult};

/// Binarizes an image using a threshold selected by Otsu's method.
///
/// Builds a 256-bin intensity histogram of the grayscale image, picks the
/// threshold that maximizes between-class variance, and maps every pixel
/// to pure black or white. Pixels strictly above the threshold become 255,
/// the rest become 0.
///
/// # Arguments
///
/// * `image` - The input image; converted to grayscale internally
///
/// # Returns
///
/// Returns a `Result` with the binary image, the chosen threshold, and
/// timing metadata, or a `PreprocessingError`
pub fn apply_otsu_threshold(
    image: &DynamicImage,
) -> Result<ThresholdedImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    let gray = image.to_luma8();

    let mut histogram = [0u32; 256];
    let total_pixels = (gray.width() * gray.height()) as f64;

    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let threshold = find_otsu_threshold(&histogram, total_pixels)?;

    let mut binary = image::GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255u8 } else { 0u8 };
        binary.put_pixel(x, y, image::Luma([value]));
    }

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "ocr_preprocessing",
        "Otsu thresholding completed in {:.2}ms: threshold={}, dimensions={}x{}",
        processing_time.as_millis(),
        threshold,
        gray.width(),
        gray.height()
    );

    Ok(ThresholdedImageResult {
        image: DynamicImage::ImageLuma8(binary),
        threshold,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Selects the threshold maximizing between-class variance.
///
/// Otsu's method treats the histogram as a mixture of two classes
/// (background and foreground) and evaluates every candidate threshold,
/// keeping the one where `w0 * w1 * (mu0 - mu1)^2` peaks. Degenerate
/// histograms where one class is empty fall back to 128.
fn find_otsu_threshold(
    histogram: &[u32; 256],
    total_pixels: f64,
) -> Result<u8, PreprocessingError> {
    if total_pixels <= 0.0 {
        return Err(PreprocessingError::ProcessingFailed {
            message: "Cannot threshold an empty image".to_string(),
        });
    }

    // One pass to accumulate pixel counts and intensity-weighted counts
    let mut cumulative_counts = [0f64; 256];
    let mut cumulative_weighted = [0f64; 256];
    let mut count = 0f64;
    let mut weighted = 0f64;

    for (intensity, &bin) in histogram.iter().enumerate() {
        count += bin as f64;
        weighted += intensity as f64 * bin as f64;
        cumulative_counts[intensity] = count;
        cumulative_weighted[intensity] = weighted;
    }

    let total_weighted = cumulative_weighted[255];
    let total_count = cumulative_counts[255];

    let mut best_variance = 0f64;
    let mut best_threshold = 128u8;

    for candidate in 1..255usize {
        let w0 = cumulative_counts[candidate] / total_pixels;
        let w1 = 1.0 - w0;

        if w0 == 0.0 || w1 == 0.0 {
            continue;
        }

        let mu0 = cumulative_weighted[candidate] / cumulative_counts[candidate];
        let foreground_count = total_count - cumulative_counts[candidate];
        let mu1 = if foreground_count > 0.0 {
            (total_weighted - cumulative_weighted[candidate]) / foreground_count
        } else {
            0.0
        };

        let variance = w0 * w1 * (mu0 - mu1).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = candidate as u8;
        }
    }

    Ok(best_threshold)
}
