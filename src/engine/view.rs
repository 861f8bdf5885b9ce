//! Serializable snapshot handed to the render layer.

use serde::{Deserialize, Serialize};

use crate::session::ids::SessionId;
use crate::session::model::{ChatEntry, GenerationEvent, Palette, SessionSummary};
use crate::session::state::SingleColorMode;

/// Everything a client needs to draw the palette page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Active session, if any.
    pub session_id: Option<SessionId>,
    /// Session theme.
    pub theme: String,
    /// Active palette.
    pub palette: Palette,
    /// Palette before the last generation.
    pub previous_palette: Palette,
    /// Last applied prompt.
    pub prompt: String,
    /// Usage advice for the active palette.
    pub advice: String,
    /// Milliseconds.
    pub timestamp: i64,
    /// Single-color sub-mode.
    pub single_color: SingleColorMode,
    /// Chat transcript, oldest first.
    pub transcript: Vec<ChatEntry>,
    /// Generation history, most recent first.
    pub history: Vec<GenerationEvent>,
    /// Saved-session listing.
    pub sessions: Vec<SessionSummary>,
    /// Palette-level generation in flight.
    pub loading: bool,
    /// Single-color regeneration in flight.
    pub loading_single: bool,
    /// Navigable location of the session.
    pub route: String,
}
