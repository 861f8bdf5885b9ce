//! Session orchestrator.
//!
//! Owns the live session (`NoSession`, `ActiveSession` and the single-color
//! overlay) and is the only writer of the transcript, history and registry.
//! Every action runs to completion on `&mut self`; the generation service is
//! the only suspension point besides persistence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::color::science::HexColor;
use crate::engine::inflight::InFlight;
use crate::engine::notice::{Notice, NoticeLevel};
use crate::engine::view::SessionView;
use crate::service::{Generation, PaletteService, ServiceError, SingleColorRequest};
use crate::session::config::PaletteConfig;
use crate::session::errors::{ActionError, ActionResult, ValidationError};
use crate::session::ids::SessionId;
use crate::session::model::{
    ChatEntry, DEFAULT_PROMPT, GenerationEvent, PALETTE_SIZE, PalettePayload, SavedSession,
    SessionSummary, default_palette, now_ms,
};
use crate::session::state::{ActiveSession, SingleColorMode, UNTITLED_THEME};
use crate::store::history::HistoryStore;
use crate::store::records::RecordStore;
use crate::store::registry::SessionRegistry;
use crate::store::transcript::{TranscriptStore, deep_copy};

/// Transcript entry appended when a palette generation fails.
pub const GENERATION_FAILED: &str = "Generation failed, please try again later.";
/// Transcript entry appended when a single-color regeneration fails.
pub const SINGLE_COLOR_FAILED: &str = "Single-color regeneration failed, please try again later.";
/// Theme given to a session rebuilt from a stray transcript.
pub const RESTORED_THEME: &str = "Restored session";

/// Card title for a fresh palette.
pub const TITLE_GENERATED: &str = "Palette generated";
/// Card title for a refined palette.
pub const TITLE_REFINED: &str = "Palette refined";
/// Card title after a single swatch was regenerated.
pub const TITLE_UPDATED: &str = "Palette updated";
/// Card title for a manual swatch change.
pub const TITLE_MANUAL: &str = "Manual adjustment";
/// Advice attached to a manual swatch change.
pub const ADVICE_MANUAL: &str = "Updated the palette from your manual adjustment.";

/// Base route of the palette page.
pub const FEATURE_ROUTE: &str = "/feature";

/// Branch taken by [`Orchestrator::generate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sessionId", rename_all = "snake_case")]
pub enum Transition {
    /// A new session was allocated.
    Created(SessionId),
    /// The active session was refined in place.
    Refined(SessionId),
}

impl Transition {
    /// Session the transition applied to.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        match self {
            Self::Created(id) | Self::Refined(id) => id,
        }
    }
}

/// Options for [`Orchestrator::load_session_by_id`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Point the route at the loaded session.
    pub update_route: bool,
    /// Emit a warning notice when the session is missing.
    pub notify_user: bool,
}

/// Coordinates the active session with its stores and the generation service.
pub struct Orchestrator {
    service: Arc<dyn PaletteService>,
    pub(super) state: ActiveSession,
    transcript: TranscriptStore,
    history: HistoryStore,
    registry: SessionRegistry,
    inflight: InFlight,
    notices: Vec<Notice>,
    route: Option<SessionId>,
}

impl Orchestrator {
    /// Build an orchestrator over a record store. Nothing is loaded until
    /// [`bootstrap`](Self::bootstrap) runs.
    #[must_use]
    pub fn new(
        service: Arc<dyn PaletteService>,
        records: Arc<dyn RecordStore>,
        config: &PaletteConfig,
    ) -> Self {
        let limits = &config.limits;
        let storage = &config.storage;
        let state = ActiveSession {
            palette: default_palette(),
            prompt: DEFAULT_PROMPT.to_string(),
            timestamp_ms: now_ms(),
            ..ActiveSession::default()
        };

        Self {
            service,
            state,
            transcript: TranscriptStore::new(
                Arc::clone(&records),
                storage.transcript_key.clone(),
                limits.max_transcript,
            ),
            history: HistoryStore::new(
                Arc::clone(&records),
                storage.history_key.clone(),
                limits.max_history,
            ),
            registry: SessionRegistry::new(
                records,
                storage.sessions_key.clone(),
                limits.max_sessions,
            ),
            inflight: InFlight::new(),
            notices: Vec::new(),
            route: None,
        }
    }

    /// Live session fields.
    #[must_use]
    pub const fn state(&self) -> &ActiveSession {
        &self.state
    }

    /// Chat transcript, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[ChatEntry] {
        self.transcript.entries()
    }

    /// Generation history, most recent first.
    #[must_use]
    pub fn history(&self) -> &[GenerationEvent] {
        self.history.events()
    }

    /// Saved sessions in registry order.
    #[must_use]
    pub fn sessions(&self) -> &[SavedSession] {
        self.registry.sessions()
    }

    /// Saved-session listing.
    #[must_use]
    pub fn session_summaries(&self) -> Vec<SessionSummary> {
        self.registry.summaries()
    }

    /// Handle on the in-flight flags.
    #[must_use]
    pub fn inflight(&self) -> InFlight {
        self.inflight.clone()
    }

    /// Pending notices, without draining them.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Navigable location of the current session.
    #[must_use]
    pub fn current_route(&self) -> String {
        self.route.as_ref().map_or_else(
            || FEATURE_ROUTE.to_string(),
            |id| format!("{FEATURE_ROUTE}/{id}"),
        )
    }

    /// Serializable view for the render layer.
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        SessionView {
            session_id: self.state.session_id.clone(),
            theme: self.state.theme.clone(),
            palette: self.state.palette.clone(),
            previous_palette: self.state.previous_palette.clone(),
            prompt: self.state.prompt.clone(),
            advice: self.state.advice.clone(),
            timestamp: self.state.timestamp_ms,
            single_color: self.state.single_color.clone(),
            transcript: self.transcript.snapshot(),
            history: self.history.events().to_vec(),
            sessions: self.registry.summaries(),
            loading: self.inflight.palette_busy(),
            loading_single: self.inflight.single_busy(),
            route: self.current_route(),
        }
    }

    /// Generate a palette for a new session, or refine the active one.
    ///
    /// Refines iff a session exists and its palette has exactly five colors.
    ///
    /// # Errors
    /// Returns a validation error for a blank prompt or a concurrent generation,
    /// and a service error when the collaborator fails. In the latter case only
    /// an error entry is added to the transcript.
    pub async fn generate(&mut self, prompt: &str) -> ActionResult<Transition> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }
        let Some(_guard) = self.inflight.begin_palette() else {
            return Err(self.reject(
                NoticeLevel::Warning,
                "A palette is already being generated",
                ValidationError::Busy,
            ));
        };

        let existing = if self.state.can_refine() {
            self.state.session_id.clone()
        } else {
            None
        };
        let result = match &existing {
            Some(id) => {
                info!("Refining palette of session {id}");
                self.service.refine(&self.state.palette, prompt).await
            }
            None => {
                info!("Generating palette for a new session");
                self.service.generate(prompt).await
            }
        };
        let generation = match result {
            Ok(generation) => generation,
            Err(e) => {
                return Err(self
                    .fail(
                        e,
                        "Palette generation failed, please try again",
                        GENERATION_FAILED,
                    )
                    .await);
            }
        };

        let transition = match existing {
            Some(id) => {
                self.state.prompt = prompt.to_string();
                Transition::Refined(id)
            }
            None => {
                let id = SessionId::new();
                self.state.session_id = Some(id.clone());
                self.state.theme = prompt.to_string();
                self.state.prompt = prompt.to_string();
                let session = SavedSession {
                    id: id.clone(),
                    theme: prompt.to_string(),
                    timestamp: now_ms(),
                    colors: generation.colors.clone(),
                    prompt: prompt.to_string(),
                    advice: generation.advice.clone(),
                    messages: self.transcript.snapshot(),
                };
                self.registry.create(session).await;
                self.route = Some(id.clone());
                Transition::Created(id)
            }
        };

        self.apply_generation(&generation);
        self.record_history(&generation).await;
        self.notify(NoticeLevel::Success, "Palette generated successfully!");

        let title = match transition {
            Transition::Created(_) => TITLE_GENERATED,
            Transition::Refined(_) => TITLE_REFINED,
        };
        self.append(ChatEntry::assistant_palette(PalettePayload {
            title: title.to_string(),
            colors: generation.colors,
            prompt: Some(prompt.to_string()),
            advice: generation.advice,
        }))
        .await;

        Ok(transition)
    }

    /// Replace the selected swatch through the generation service.
    ///
    /// Allocates a session when none exists, using the theme, the last prompt
    /// or a placeholder as its theme.
    ///
    /// # Errors
    /// Returns a validation error when no swatch is selected, the base palette
    /// is not complete or the target cannot be located. Returns a service error
    /// when the collaborator fails.
    pub async fn regenerate_single_color(&mut self) -> ActionResult<SessionId> {
        let Some(target) = self.state.single_color.target_hex.clone() else {
            return Err(self.reject(
                NoticeLevel::Warning,
                "Pick the color to replace first",
                ValidationError::NoTargetColor,
            ));
        };

        let base = self
            .state
            .single_color
            .resolve_base(&self.state.palette)
            .to_vec();
        if base.len() != PALETTE_SIZE {
            return Err(self.reject(
                NoticeLevel::Error,
                "The palette does not have five colors, single-color editing is unavailable",
                ValidationError::IncompletePalette {
                    expected: PALETTE_SIZE,
                    found: base.len(),
                },
            ));
        }

        let target_index = match self.state.single_color.resolve_target_index(&base) {
            Ok(index) if index < base.len() => index,
            Ok(index) => {
                return Err(self.reject(
                    NoticeLevel::Error,
                    "Could not locate the color to replace",
                    ValidationError::IndexOutOfRange {
                        index,
                        len: base.len(),
                    },
                ));
            }
            Err(e) => {
                return Err(self.reject(
                    NoticeLevel::Error,
                    "Could not locate the color to replace",
                    e,
                ));
            }
        };

        let Some(_guard) = self.inflight.begin_single() else {
            return Err(self.reject(
                NoticeLevel::Warning,
                "A color is already being regenerated",
                ValidationError::Busy,
            ));
        };

        let pending = self.state.single_color.pending_prompt.trim();
        let prompt = if pending.is_empty() {
            SingleColorMode::default_prompt(&target)
        } else {
            pending.to_string()
        };
        let request = SingleColorRequest {
            prompt: prompt.clone(),
            base_colors: base,
            target_index,
        };

        info!("Regenerating color {target} at index {target_index}");
        let generation = match self.service.regenerate_one(&request).await {
            Ok(generation) => generation,
            Err(e) => {
                return Err(self
                    .fail(
                        e,
                        "Single-color regeneration failed, please try again",
                        SINGLE_COLOR_FAILED,
                    )
                    .await);
            }
        };

        let session_id = match self.state.session_id.clone() {
            Some(id) => id,
            None => {
                let id = SessionId::new();
                info!("Allocated session {id} for a single-color edit");
                self.state.theme = self.state.theme_or_fallback();
                self.state.session_id = Some(id.clone());
                self.route = Some(id.clone());
                id
            }
        };
        self.state.prompt.clone_from(&prompt);
        self.apply_generation(&generation);
        self.record_history(&generation).await;

        self.append(ChatEntry::assistant_palette(PalettePayload {
            title: TITLE_UPDATED.to_string(),
            colors: generation.colors,
            prompt: Some(prompt),
            advice: generation.advice,
        }))
        .await;
        self.notify(
            NoticeLevel::Success,
            "Regenerated the selected color and updated the palette",
        );
        self.clear_single_color_mode();

        Ok(session_id)
    }

    /// Replace one swatch by hand. Out-of-range indexes are ignored.
    ///
    /// Persists the transcript and the registry; history is untouched since no
    /// generation happened.
    pub async fn manual_edit(&mut self, index: usize, color: HexColor) -> bool {
        let Some(slot) = self.state.palette.get_mut(index) else {
            debug!("Ignoring manual edit at index {index}");
            return false;
        };
        *slot = color;

        self.append(ChatEntry::assistant_palette(PalettePayload {
            title: TITLE_MANUAL.to_string(),
            colors: self.state.palette.clone(),
            prompt: None,
            advice: ADVICE_MANUAL.to_string(),
        }))
        .await;
        if self.state.session_id.is_some() {
            self.save_current_session().await;
        } else {
            self.registry.save().await;
        }
        true
    }

    /// Leave the single-color overlay.
    pub fn clear_single_color_mode(&mut self) {
        self.state.single_color = SingleColorMode::default();
    }

    /// Reset to the no-session state with a fresh greeting.
    pub async fn start_new(&mut self) {
        self.state.reset();
        self.state.timestamp_ms = now_ms();
        self.route = None;
        self.transcript.reset(ChatEntry::greeting()).await;
        info!("Started a new conversation");
    }

    /// Load a saved session by id.
    ///
    /// When another session is active it is saved first.
    ///
    /// # Errors
    /// Returns [`ActionError::NotFound`] when no saved session matches.
    pub async fn load_session_by_id(
        &mut self,
        raw_id: &str,
        options: LoadOptions,
    ) -> ActionResult<SessionId> {
        if self.registry.is_empty() {
            self.registry.load().await;
        }
        let Some(session) = self.registry.find_by_id(raw_id).cloned() else {
            warn!("Session {raw_id} not found");
            if options.notify_user {
                self.notify(NoticeLevel::Warning, "Session not found");
            }
            return Err(ActionError::NotFound(raw_id.trim().to_string()));
        };

        let switching = self
            .state
            .session_id
            .as_ref()
            .is_some_and(|current| *current != session.id);
        if switching {
            self.save_current_session().await;
        }

        let id = session.id.clone();
        self.apply_session(session).await;
        if options.update_route {
            self.route = Some(id.clone());
        }
        info!("Loaded session {id}");
        Ok(id)
    }

    /// Switch to a saved session from the history panel.
    ///
    /// # Errors
    /// Returns [`ActionError::NotFound`] when no saved session matches.
    pub async fn load_session(&mut self, raw_id: &str) -> ActionResult<SessionId> {
        if let Some(id) = self
            .state
            .session_id
            .as_ref()
            .filter(|id| id.matches(raw_id))
        {
            return Ok(id.clone());
        }

        let id = self
            .load_session_by_id(
                raw_id,
                LoadOptions {
                    update_route: true,
                    notify_user: false,
                },
            )
            .await?;
        let theme = match self.state.theme.trim() {
            "" => UNTITLED_THEME.to_string(),
            theme => theme.to_string(),
        };
        self.notify(NoticeLevel::Success, format!("Switched to session: {theme}"));
        Ok(id)
    }

    /// React to an external change of the routed session id.
    ///
    /// # Errors
    /// Returns [`ActionError::NotFound`] when no saved session matches.
    pub async fn on_route_change(&mut self, raw_id: &str) -> ActionResult<SessionId> {
        let id = self
            .load_session_by_id(raw_id, LoadOptions::default())
            .await?;
        self.route = Some(id.clone());
        Ok(id)
    }

    /// Delete a saved session. Deleting the active one starts a new conversation.
    pub async fn delete_session(&mut self, raw_id: &str) -> bool {
        let Ok(id) = SessionId::parse(raw_id) else {
            return false;
        };
        let removed = self.registry.delete(&id).await;
        if self.state.is_active(&id) {
            self.start_new().await;
        }
        info!("Deleted session {id} (found: {removed})");
        removed
    }

    /// Recover the most recent saved session, or adopt a stray transcript, or
    /// start fresh.
    pub async fn restore_latest_or_prompt(&mut self) -> Option<SessionId> {
        if self.registry.is_empty() {
            self.registry.load().await;
        }

        if let Some(latest) = self.registry.most_recent().map(|session| session.id.clone()) {
            let options = LoadOptions {
                update_route: true,
                notify_user: false,
            };
            return self
                .load_session_by_id(latest.as_str(), options)
                .await
                .ok();
        }

        self.transcript.load().await;
        if self.transcript.len() > 1 {
            let id = SessionId::new();
            info!("Adopting stored transcript as session {id}");
            self.state.session_id = Some(id.clone());
            self.state.theme = RESTORED_THEME.to_string();
            self.save_current_session().await;
            self.route = Some(id.clone());
            return Some(id);
        }

        self.start_new().await;
        None
    }

    /// Startup sequence: probe the service, load the stores, then restore.
    pub async fn bootstrap(&mut self, route_id: Option<&str>) -> Option<SessionId> {
        match self.service.health_check().await {
            Ok(()) => self.notify(NoticeLevel::Success, "Connected to the palette service"),
            Err(e) => {
                warn!("Palette service health check failed: {e}");
                self.notify(
                    NoticeLevel::Warning,
                    "Cannot reach the palette service, make sure the backend is running",
                );
            }
        }

        self.registry.load().await;
        self.history.load().await;

        match route_id.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let options = LoadOptions {
                    update_route: false,
                    notify_user: true,
                };
                match self.load_session_by_id(raw, options).await {
                    Ok(id) => {
                        self.route = Some(id.clone());
                        Some(id)
                    }
                    Err(_) => {
                        self.start_new().await;
                        None
                    }
                }
            }
            None => self.restore_latest_or_prompt().await,
        }
    }

    /// Write the active session into the registry.
    pub async fn save_current_session(&mut self) {
        let Some(id) = self.state.session_id.clone() else {
            return;
        };
        let session = SavedSession {
            id,
            theme: self.state.theme.clone(),
            timestamp: now_ms(),
            colors: self.state.palette.clone(),
            prompt: self.state.prompt.clone(),
            advice: self.state.advice.clone(),
            messages: self.transcript.snapshot(),
        };
        self.registry.replace_or_insert(session).await;
    }

    /// Best-effort save before teardown. Failures are only logged.
    pub async fn flush(&mut self) {
        self.save_current_session().await;
        if let Err(e) = self.history.persist().await {
            warn!("Failed to flush history: {e}");
        }
        if let Err(e) = self.transcript.persist().await {
            warn!("Failed to flush transcript: {e}");
        }
        info!("Flushed session state");
    }

    pub(super) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice::new(level, message);
        debug!("Notice ({:?}): {}", notice.level, notice.message);
        self.notices.push(notice);
    }

    pub(super) fn reject(
        &mut self,
        level: NoticeLevel,
        message: &str,
        err: ValidationError,
    ) -> ActionError {
        warn!("Rejected action: {err}");
        self.notify(level, message);
        ActionError::Validation(err)
    }

    pub(super) async fn append(&mut self, entry: ChatEntry) {
        self.transcript.append(entry).await;
    }

    async fn fail(&mut self, err: ServiceError, notice: &str, entry: &str) -> ActionError {
        error!("Palette service call failed: {err}");
        self.notify(NoticeLevel::Error, notice);
        self.append(ChatEntry::assistant_text(entry)).await;
        ActionError::Service(err)
    }

    fn apply_generation(&mut self, generation: &Generation) {
        self.state.previous_palette =
            std::mem::replace(&mut self.state.palette, generation.colors.clone());
        self.state.timestamp_ms = generation.timestamp_ms();
        self.state.advice.clone_from(&generation.advice);
    }

    async fn record_history(&mut self, generation: &Generation) {
        let Some(id) = self.state.session_id.clone() else {
            return;
        };
        self.history
            .upsert(GenerationEvent {
                id,
                prompt: self.state.theme.clone(),
                current_prompt: self.state.prompt.clone(),
                colors: generation.colors.clone(),
                timestamp: generation.timestamp,
                advice: generation.advice.clone(),
            })
            .await;
    }

    async fn apply_session(&mut self, session: SavedSession) {
        let timestamp_ms = match session.timestamp_ms() {
            0 => now_ms(),
            ms => ms,
        };
        let messages = if session.messages.is_empty() {
            vec![ChatEntry::greeting()]
        } else {
            deep_copy(&session.messages)
        };
        let previous_palette = messages
            .iter()
            .rev()
            .filter_map(ChatEntry::palette_colors)
            .nth(1)
            .map(<[HexColor]>::to_vec)
            .unwrap_or_default();

        self.state = ActiveSession {
            session_id: Some(session.id),
            theme: session.theme,
            palette: session.colors,
            previous_palette,
            prompt: session.prompt,
            advice: session.advice,
            timestamp_ms,
            single_color: SingleColorMode::default(),
        };
        self.transcript.replace(messages).await;
    }
}
