//! # Extraction Store Module
//!
//! In-memory registry of extraction results keyed by stored filename.
//! Results move through `pending -> processing -> completed | failed`;
//! timestamps come from an injectable [`Clock`] so tests can control time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::text::{self, TextCounts};

/// Time source for result timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lifecycle state of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One extraction record.
///
/// `text` is set only on completion, `error` only on failure;
/// `processed_at` is set when the record reaches a terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub id: Uuid,
    pub filename: String,
    pub text: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub status: ExtractionStatus,
}

impl ExtractionResult {
    /// Counts over the extracted text; an absent text counts as empty.
    pub fn counts(&self) -> TextCounts {
        text::counts(self.text.as_deref().unwrap_or(""))
    }
}

/// Thread-safe store of extraction results.
pub struct ExtractionStore {
    entries: RwLock<HashMap<String, ExtractionResult>>,
    clock: Arc<dyn Clock>,
}

impl ExtractionStore {
    /// Creates a store backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a store with a caller-provided time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Registers a newly ingested file as `pending`.
    ///
    /// Keeps any existing record for the filename untouched so a
    /// re-registration cannot wipe an in-flight or finished extraction.
    pub fn register(&self, filename: &str) {
        let mut entries = self.entries.write();
        entries
            .entry(filename.to_string())
            .or_insert_with(|| ExtractionResult {
                id: Uuid::new_v4(),
                filename: filename.to_string(),
                text: None,
                error: None,
                created_at: self.clock.now(),
                processed_at: None,
                status: ExtractionStatus::Pending,
            });
    }

    /// Marks an extraction as `processing`, creating the record if needed.
    ///
    /// Restarting an extraction clears any previous text, error, and
    /// completion timestamp.
    pub fn begin(&self, filename: &str) {
        let mut entries = self.entries.write();
        let now = self.clock.now();
        entries.insert(
            filename.to_string(),
            ExtractionResult {
                id: Uuid::new_v4(),
                filename: filename.to_string(),
                text: None,
                error: None,
                created_at: now,
                processed_at: None,
                status: ExtractionStatus::Processing,
            },
        );
    }

    /// Records a successful extraction. No-op if the filename is unknown.
    pub fn complete(&self, filename: &str, extracted_text: &str) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(filename) {
            entry.text = Some(extracted_text.to_string());
            entry.error = None;
            entry.processed_at = Some(self.clock.now());
            entry.status = ExtractionStatus::Completed;
        }
    }

    /// Records a failed extraction. No-op if the filename is unknown.
    pub fn fail(&self, filename: &str, message: &str) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(filename) {
            entry.text = None;
            entry.error = Some(message.to_string());
            entry.processed_at = Some(self.clock.now());
            entry.status = ExtractionStatus::Failed;
        }
    }

    /// Returns a clone of the record for a filename, if present.
    pub fn get(&self, filename: &str) -> Option<ExtractionResult> {
        self.entries.read().get(filename).cloned()
    }

    /// Returns all records ordered by creation time.
    pub fn list(&self) -> Vec<ExtractionResult> {
        let mut results: Vec<ExtractionResult> = self.entries.read().values().cloned().collect();
        results.sort_by_key(|r| r.created_at);
        results
    }

    /// Removes and returns the record for a filename.
    pub fn remove(&self, filename: &str) -> Option<ExtractionResult> {
        self.entries.write().remove(filename)
    }

    /// Evicts records strictly older than `max_age_hours`, returning how
    /// many were removed. Age is measured from `created_at`.
    pub fn cleanup_older_than(&self, max_age_hours: u64) -> usize {
        let cutoff = self.clock.now() - chrono::Duration::hours(max_age_hours as i64);
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.created_at >= cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ExtractionStore {
    fn default() -> Self {
        Self::new()
    }
}
