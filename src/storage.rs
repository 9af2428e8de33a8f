//! # Local Storage Module
//!
//! Filesystem-backed storage for uploaded and captured images. Files live
//! flat under one root directory; stored names are generated server-side
//! so client-supplied names can never escape the root or collide.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::CleanupPolicy;
use crate::errors::{AppError, AppResult};

lazy_static! {
    /// Characters allowed to survive in a stamped base name: word
    /// characters, spaces, and dashes.
    static ref STEM_SANITIZER: Regex =
        Regex::new(r"[^\w \-]").expect("Failed to compile stem sanitizer regex");
    /// Characters stripped from prefixed names: anything outside
    /// ASCII alphanumerics, underscore, dot, and dash.
    static ref UNSAFE_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9_.\-]").expect("Failed to compile unsafe chars regex");
}

/// Windows device names that must never become a file stem.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Naming scheme applied when a file is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// `{base}_{YYYYMMDD_HHMMSS}_{8 hex}{ext}`, used for captures.
    Stamped,
    /// `{32 hex}_{sanitized original}`, used for uploads.
    Prefixed,
}

/// Metadata snapshot of one stored file.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub filepath: String,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// `"WxH"` when the file decodes as an image.
    pub dimensions: Option<String>,
    /// Lowercased extension including the dot, e.g. `".png"`.
    pub file_type: String,
}

/// Aggregate disk usage of the storage root.
#[derive(Debug, Clone, Serialize)]
pub struct StorageUsage {
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
    pub file_count: usize,
    pub folder_path: String,
}

/// Outcome of a cleanup sweep.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub deleted_count: usize,
    pub deleted_files: Vec<String>,
    pub message: String,
}

/// Reduces an untrusted filename to a safe single path component.
///
/// Keeps only ASCII alphanumerics, underscore, dot, and dash; path
/// components are flattened to the final one, whitespace runs become
/// underscores, and leading or trailing dots and underscores are
/// trimmed. Windows device names get a leading underscore. An empty
/// result falls back to `"file"`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return "file".to_string();
    }
    let mut result = trimmed.to_string();
    let stem_upper = result.split('.').next().unwrap_or("").to_uppercase();
    if RESERVED_NAMES.contains(&stem_upper.as_str()) {
        result.insert(0, '_');
    }
    result
}

/// Builds a timestamped name from a hint, e.g.
/// `capture_20240512_091500_1f2e3d4c.jpg`.
///
/// The hint's stem keeps word characters, spaces, and dashes (falling
/// back to `"image"` when nothing survives); the extension is carried
/// over with its original case.
pub fn generate_stamped_name(original: &str) -> String {
    let path = Path::new(original);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let sanitized = STEM_SANITIZER.replace_all(stem, "");
    let mut base = sanitized.trim_end().to_string();
    if base.is_empty() {
        base = "image".to_string();
    }

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let token = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}{}", base, timestamp, &token[..8], ext)
}

/// Builds a collision-free name by prefixing the sanitized original
/// with 32 hex characters, e.g. `3f2e..._receipt.png`.
pub fn generate_prefixed_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(original))
}

/// Rejects names that could resolve outside the storage root.
fn ensure_safe_name(filename: &str) -> AppResult<()> {
    if filename.trim().is_empty() {
        return Err(AppError::Validation("Filename must not be empty".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(AppError::Validation(format!(
            "Filename '{}' contains path separators",
            filename
        )));
    }
    if filename == "." || filename == ".." {
        return Err(AppError::Validation(format!(
            "Filename '{}' is not a valid file name",
            filename
        )));
    }
    if filename.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation(format!(
            "Filename '{}' contains control characters",
            filename
        )));
    }
    let stem_upper = filename.split('.').next().unwrap_or("").to_uppercase();
    if RESERVED_NAMES.contains(&stem_upper.as_str()) {
        return Err(AppError::Validation(format!(
            "Filename '{}' uses a reserved device name",
            filename
        )));
    }
    Ok(())
}

/// Flat file store rooted at one directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under a generated name and returns that name.
    ///
    /// The root directory is created on demand. A failed write removes
    /// any partial file before the error is returned.
    ///
    /// # Arguments
    /// * `bytes` - File content to persist
    /// * `name_hint` - Client-supplied name the generated name derives from
    /// * `pattern` - Naming scheme to apply
    pub fn save(&self, bytes: &[u8], name_hint: &str, pattern: NamePattern) -> AppResult<String> {
        fs::create_dir_all(&self.root)?;

        let filename = match pattern {
            NamePattern::Stamped => generate_stamped_name(name_hint),
            NamePattern::Prefixed => generate_prefixed_name(name_hint),
        };
        let path = self.root.join(&filename);
        if let Err(e) = fs::write(&path, bytes) {
            let _ = fs::remove_file(&path);
            return Err(AppError::Storage(format!(
                "Failed to write file '{}': {}",
                filename, e
            )));
        }

        info!(
            filename = %filename,
            size_bytes = bytes.len(),
            "File stored"
        );
        Ok(filename)
    }

    /// Reads a stored file's content.
    pub fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        let path = self.path_of(filename)?;
        if !path.is_file() {
            return Err(AppError::NotFound(format!("File not found: {}", filename)));
        }
        Ok(fs::read(&path)?)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path_of(filename)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Deletes a stored file.
    pub fn delete(&self, filename: &str) -> AppResult<()> {
        let path = self.path_of(filename)?;
        if !path.is_file() {
            return Err(AppError::NotFound(format!("File not found: {}", filename)));
        }
        fs::remove_file(&path)?;
        info!(filename = %filename, "File deleted");
        Ok(())
    }

    /// Lists stored filenames in lexicographic order. Subdirectories are
    /// skipped; a missing root yields an empty list.
    pub fn list(&self) -> AppResult<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolves a stored filename to its absolute path, rejecting names
    /// that could escape the root.
    pub fn path_of(&self, filename: &str) -> AppResult<PathBuf> {
        ensure_safe_name(filename)?;
        Ok(self.root.join(filename))
    }

    /// Returns the metadata snapshot for one stored file.
    pub fn stat(&self, filename: &str) -> AppResult<FileInfo> {
        let path = self.path_of(filename)?;
        if !path.is_file() {
            return Err(AppError::NotFound(format!("File not found: {}", filename)));
        }
        let metadata = fs::metadata(&path)?;
        let size_bytes = metadata.len();
        let dimensions = image::image_dimensions(&path)
            .ok()
            .map(|(w, h)| format!("{}x{}", w, h));
        let file_type = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        Ok(FileInfo {
            filename: filename.to_string(),
            filepath: path.display().to_string(),
            size_bytes,
            size_mb: round_mb(size_bytes),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            dimensions,
            file_type,
        })
    }

    /// Deletes stored files according to the policy and reports what
    /// was removed.
    ///
    /// `OlderThanMinutes` compares against the file's modification time
    /// and only deletes files strictly older than the limit. A file
    /// that fails to delete is logged and skipped.
    pub fn cleanup(&self, policy: &CleanupPolicy) -> AppResult<CleanupReport> {
        let now = SystemTime::now();
        let mut deleted_files = Vec::new();

        for name in self.list()? {
            let path = self.root.join(&name);
            let eligible = match policy {
                CleanupPolicy::All => true,
                CleanupPolicy::OlderThanMinutes(minutes) => {
                    file_age_secs(&path, now).map_or(false, |age| age > minutes * 60)
                }
            };
            if !eligible {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => deleted_files.push(name),
                Err(e) => {
                    warn!(filename = %name, error = %e, "Failed to delete file during cleanup");
                }
            }
        }

        let deleted_count = deleted_files.len();
        let message = match policy {
            CleanupPolicy::All => format!("Cleaned up {} files", deleted_count),
            CleanupPolicy::OlderThanMinutes(minutes) => format!(
                "Cleaned up {} files older than {} minutes",
                deleted_count, minutes
            ),
        };
        info!(deleted_count, "Storage cleanup finished");

        Ok(CleanupReport {
            deleted_count,
            deleted_files,
            message,
        })
    }

    /// Sums size and count over all stored files.
    pub fn usage(&self) -> AppResult<StorageUsage> {
        let mut total_size_bytes = 0u64;
        let mut file_count = 0usize;
        for name in self.list()? {
            let metadata = fs::metadata(self.root.join(&name))?;
            total_size_bytes += metadata.len();
            file_count += 1;
        }
        Ok(StorageUsage {
            total_size_bytes,
            total_size_mb: round_mb(total_size_bytes),
            file_count,
            folder_path: self.root.display().to_string(),
        })
    }
}

/// Bytes to mebibytes, rounded to two decimal places.
fn round_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// Seconds since the file was last modified, `None` when the
/// modification time is unavailable or in the future.
fn file_age_secs(path: &Path, now: SystemTime) -> Option<u64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    now.duration_since(modified).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stamped_name_keeps_base_and_extension_case() {
        let name = generate_stamped_name("My Scan-1.JPG");
        let pattern = Regex::new(r"^My Scan-1_\d{8}_\d{6}_[0-9a-f]{8}\.JPG$").unwrap();
        assert!(pattern.is_match(&name), "unexpected name: {}", name);
    }

    #[test]
    fn test_stamped_name_falls_back_to_image() {
        let name = generate_stamped_name("???.png");
        let pattern = Regex::new(r"^image_\d{8}_\d{6}_[0-9a-f]{8}\.png$").unwrap();
        assert!(pattern.is_match(&name), "unexpected name: {}", name);
    }

    #[test]
    fn test_prefixed_name_flattens_traversal() {
        let name = generate_prefixed_name("../../etc/passwd");
        let pattern = Regex::new(r"^[0-9a-f]{32}_passwd$").unwrap();
        assert!(pattern.is_match(&name), "unexpected name: {}", name);
    }

    #[test]
    fn test_sanitize_filename_cases() {
        assert_eq!(sanitize_filename("my file.png"), "my_file.png");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("café.png"), "caf.png");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("CON.txt"), "_CON.txt");
    }

    #[test]
    fn test_save_read_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let name = storage
            .save(b"payload", "note.txt", NamePattern::Prefixed)
            .unwrap();
        assert!(storage.exists(&name));
        assert_eq!(storage.read(&name).unwrap(), b"payload");

        storage.delete(&name).unwrap();
        assert!(!storage.exists(&name));
        assert!(matches!(storage.read(&name), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_save_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested").join("uploads"));
        let name = storage
            .save(b"data", "a.bin", NamePattern::Prefixed)
            .unwrap();
        assert!(storage.exists(&name));
    }

    #[test]
    fn test_path_of_rejects_traversal_names() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.path_of("../../etc/passwd").is_err());
        assert!(storage.path_of("a/b.png").is_err());
        assert!(storage.path_of("..").is_err());
        assert!(storage.path_of("").is_err());
        assert!(storage.path_of("NUL.png").is_err());
    }

    #[test]
    fn test_path_of_accepts_stamped_names_with_spaces() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.path_of("My Scan-1_20240512_091500_1f2e3d4c.JPG").is_ok());
    }

    #[test]
    fn test_list_sorted_and_files_only() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("b.png"), b"b").unwrap();
        fs::write(dir.path().join("a.png"), b"a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(storage.list().unwrap(), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let storage = LocalStorage::new("/nonexistent/textgrab-test-root");
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_stat_reports_size_and_type() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("doc.PNG"), vec![0u8; 2048]).unwrap();

        let info = storage.stat("doc.PNG").unwrap();
        assert_eq!(info.size_bytes, 2048);
        assert_eq!(info.file_type, ".png");
        assert!(info.dimensions.is_none());
        assert!(info.filepath.ends_with("doc.PNG"));
    }

    #[test]
    fn test_stat_reports_image_dimensions() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let img = image::GrayImage::from_pixel(40, 30, image::Luma([200u8]));
        img.save(dir.path().join("gray.png")).unwrap();

        let info = storage.stat("gray.png").unwrap();
        assert_eq!(info.dimensions.as_deref(), Some("40x30"));
    }

    #[test]
    fn test_usage_sums_sizes() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("a.bin"), vec![0u8; 1024]).unwrap();
        fs::write(dir.path().join("b.bin"), vec![0u8; 512]).unwrap();

        let usage = storage.usage().unwrap();
        assert_eq!(usage.total_size_bytes, 1536);
        assert_eq!(usage.file_count, 2);
        assert!((usage.total_size_mb - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cleanup_all_removes_everything() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("a.bin"), b"a").unwrap();
        fs::write(dir.path().join("b.bin"), b"b").unwrap();

        let report = storage.cleanup(&CleanupPolicy::All).unwrap();
        assert_eq!(report.deleted_count, 2);
        assert_eq!(report.message, "Cleaned up 2 files");
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_age_spares_fresh_files() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("fresh.bin"), b"f").unwrap();

        let report = storage
            .cleanup(&CleanupPolicy::OlderThanMinutes(60))
            .unwrap();
        assert_eq!(report.deleted_count, 0);
        assert!(storage.exists("fresh.bin"));
    }

    #[test]
    fn test_round_mb_two_decimals() {
        assert!((round_mb(1024 * 1024) - 1.0).abs() < f64::EPSILON);
        assert!((round_mb(1536 * 1024) - 1.5).abs() < f64::EPSILON);
        assert!((round_mb(10) - 0.0).abs() < f64::EPSILON);
    }
}
