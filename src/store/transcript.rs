//! Bounded chat transcript.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::session::model::ChatEntry;
use crate::store::error::StoreResult;
use crate::store::records::{RecordStore, load_or_default, save_json};

/// Independent copy of a transcript.
///
/// Goes through a JSON round trip so nothing in the copy can share state with
/// the source. If encoding fails the entries are cloned instead, which is still
/// a deep copy for owned data.
#[must_use]
pub fn deep_copy(entries: &[ChatEntry]) -> Vec<ChatEntry> {
    match serde_json::to_value(entries).and_then(serde_json::from_value) {
        Ok(copy) => copy,
        Err(e) => {
            warn!("Transcript copy fell back to clone: {e}");
            entries.to_vec()
        }
    }
}

/// Ordered chat log, trimmed from the head beyond `capacity`.
pub struct TranscriptStore {
    records: Arc<dyn RecordStore>,
    key: String,
    capacity: usize,
    entries: Vec<ChatEntry>,
}

impl TranscriptStore {
    /// Empty transcript bound to `key`.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            records,
            key: key.into(),
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    /// Current entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append, trim, persist.
    pub async fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
        self.trim();
        self.save().await;
    }

    /// Replace the whole transcript (session switch, reset), then persist.
    pub async fn replace(&mut self, entries: Vec<ChatEntry>) {
        self.entries = entries;
        self.trim();
        self.save().await;
    }

    /// Reset to a single entry, usually the greeting.
    pub async fn reset(&mut self, first: ChatEntry) {
        self.replace(vec![first]).await;
    }

    /// Drop every entry and persist the empty list.
    pub async fn clear(&mut self) {
        self.replace(Vec::new()).await;
    }

    /// Reload from persistence; absent or corrupt records yield an empty list.
    pub async fn load(&mut self) {
        self.entries = load_or_default(self.records.as_ref(), &self.key).await;
        self.trim();
        debug!("Loaded {} transcript entries", self.entries.len());
    }

    /// Write the full list.
    ///
    /// # Errors
    /// Returns an error if encoding or storage access fails.
    pub async fn persist(&self) -> StoreResult<()> {
        save_json(self.records.as_ref(), &self.key, &self.entries).await
    }

    /// Deep copy of the current entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        deep_copy(&self.entries)
    }

    fn trim(&mut self) {
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }

    async fn save(&self) {
        if let Err(e) = self.persist().await {
            warn!("Failed to persist transcript: {e}");
        }
    }
}
