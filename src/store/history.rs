//! Generation history, one record per session.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::session::ids::SessionId;
use crate::session::model::GenerationEvent;
use crate::store::error::StoreResult;
use crate::store::records::{RecordStore, load_or_default, save_json};

/// Most-recent-first list of generation events.
pub struct HistoryStore {
    records: Arc<dyn RecordStore>,
    key: String,
    capacity: usize,
    events: Vec<GenerationEvent>,
}

impl HistoryStore {
    /// Empty history bound to `key`.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            records,
            key: key.into(),
            capacity: capacity.max(1),
            events: Vec::new(),
        }
    }

    /// Current events, most recent first.
    #[must_use]
    pub fn events(&self) -> &[GenerationEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event recorded for a session.
    #[must_use]
    pub fn find(&self, id: &SessionId) -> Option<&GenerationEvent> {
        self.events.iter().find(|event| event.id == *id)
    }

    /// Replace the session's record in place, or insert it at the front.
    /// The tail is evicted when the list grows past capacity.
    pub async fn upsert(&mut self, event: GenerationEvent) {
        match self.events.iter().position(|existing| existing.id == event.id) {
            Some(index) => self.events[index] = event,
            None => self.events.insert(0, event),
        }
        self.events.truncate(self.capacity);
        self.save().await;
    }

    /// Reload from persistence; absent or corrupt records yield an empty list.
    pub async fn load(&mut self) {
        self.events = load_or_default(self.records.as_ref(), &self.key).await;
        self.events.truncate(self.capacity);
        debug!("Loaded {} history events", self.events.len());
    }

    /// Write the full list.
    ///
    /// # Errors
    /// Returns an error if encoding or storage access fails.
    pub async fn persist(&self) -> StoreResult<()> {
        save_json(self.records.as_ref(), &self.key, &self.events).await
    }

    async fn save(&self) {
        if let Err(e) = self.persist().await {
            warn!("Failed to persist history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::science::HexColor;
    use crate::store::records::MemoryRecordStore;

    fn event(id: &str, prompt: &str) -> GenerationEvent {
        GenerationEvent {
            id: SessionId::parse(id).unwrap(),
            prompt: prompt.to_string(),
            current_prompt: prompt.to_string(),
            colors: vec![HexColor::parse("#123456").unwrap()],
            timestamp: 1_700_000_000,
            advice: String::new(),
        }
    }

    fn ids(history: &HistoryStore) -> Vec<&str> {
        history.events().iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut history = HistoryStore::new(records, "history", 5);
        history.upsert(event("a", "one")).await;
        history.upsert(event("b", "two")).await;
        history.upsert(event("a", "three")).await;

        assert_eq!(ids(&history), vec!["b", "a"]);
        assert_eq!(history.len(), 2);
        let updated = history.find(&SessionId::parse("a").unwrap()).unwrap();
        assert_eq!(updated.current_prompt, "three");
    }

    #[tokio::test]
    async fn test_cap_evicts_tail() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut history = HistoryStore::new(records, "history", 3);
        for id in ["a", "b", "c", "d", "e"] {
            history.upsert(event(id, id)).await;
        }
        assert_eq!(ids(&history), vec!["e", "d", "c"]);

        // Touching an existing record keeps its slot.
        history.upsert(event("d", "again")).await;
        assert_eq!(ids(&history), vec!["e", "d", "c"]);
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut history = HistoryStore::new(records.clone(), "history", 5);
        history.upsert(event("a", "one")).await;

        let mut reloaded = HistoryStore::new(records, "history", 5);
        reloaded.load().await;
        assert_eq!(reloaded.events(), history.events());
    }
}
