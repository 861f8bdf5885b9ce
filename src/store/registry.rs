//! Saved-session registry.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::session::ids::SessionId;
use crate::session::model::{SavedSession, SessionSummary};
use crate::store::error::StoreResult;
use crate::store::records::{RecordStore, load_or_default, save_json};

/// Most-recent-first list of saved sessions.
pub struct SessionRegistry {
    records: Arc<dyn RecordStore>,
    key: String,
    capacity: usize,
    sessions: Vec<SavedSession>,
}

impl SessionRegistry {
    /// Empty registry bound to `key`.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            records,
            key: key.into(),
            capacity: capacity.max(1),
            sessions: Vec::new(),
        }
    }

    /// Saved sessions in registry order.
    #[must_use]
    pub fn sessions(&self) -> &[SavedSession] {
        &self.sessions
    }

    /// Number of saved sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Listing view.
    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SavedSession::summary).collect()
    }

    /// Lookup by the normalised string form of the id.
    #[must_use]
    pub fn find_by_id(&self, raw_id: &str) -> Option<&SavedSession> {
        self.sessions.iter().find(|session| session.id.matches(raw_id))
    }

    /// Insert a new session at the front.
    pub async fn create(&mut self, session: SavedSession) {
        info!("Saved new session {}", session.id);
        self.insert_front(session);
        self.save().await;
    }

    /// Replace the stored copy of the session, or insert it at the front.
    pub async fn replace_or_insert(&mut self, session: SavedSession) {
        match self.position(session.id.as_str()) {
            Some(index) => self.sessions[index] = session,
            None => self.insert_front(session),
        }
        self.save().await;
    }

    /// Remove a session. Returns whether anything was removed.
    pub async fn delete(&mut self, id: &SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.id != *id);
        let removed = self.sessions.len() != before;
        self.save().await;
        removed
    }

    /// Re-order by recency and return the newest session.
    pub fn most_recent(&mut self) -> Option<&SavedSession> {
        self.sessions
            .sort_by(|left, right| right.timestamp_ms().cmp(&left.timestamp_ms()));
        self.sessions.first()
    }

    /// Reload from persistence; absent or corrupt records yield an empty list.
    pub async fn load(&mut self) {
        self.sessions = load_or_default(self.records.as_ref(), &self.key).await;
        self.sessions.truncate(self.capacity);
        debug!("Loaded {} saved sessions", self.sessions.len());
    }

    /// Write the full list.
    ///
    /// # Errors
    /// Returns an error if encoding or storage access fails.
    pub async fn persist(&self) -> StoreResult<()> {
        save_json(self.records.as_ref(), &self.key, &self.sessions).await
    }

    /// Persist, logging failures.
    pub async fn save(&self) {
        if let Err(e) = self.persist().await {
            warn!("Failed to persist sessions: {e}");
        }
    }

    fn position(&self, raw_id: &str) -> Option<usize> {
        self.sessions
            .iter()
            .position(|session| session.id.matches(raw_id))
    }

    fn insert_front(&mut self, session: SavedSession) {
        self.sessions.insert(0, session);
        self.sessions.truncate(self.capacity);
    }
}
