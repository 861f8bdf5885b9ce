//! Live fields of the conversation owned by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::color::science::HexColor;
use crate::session::errors::ValidationError;
use crate::session::ids::SessionId;
use crate::session::model::{PALETTE_SIZE, Palette};

/// Fallback theme when neither a theme nor a prompt exists.
pub const UNTITLED_THEME: &str = "Untitled theme";

/// Sub-mode entered after picking a swatch to replace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleColorMode {
    /// Whether the sub-mode is active.
    pub enabled: bool,
    /// Swatch being replaced.
    pub target_hex: Option<HexColor>,
    /// Index of the swatch, when known.
    pub target_index: Option<usize>,
    /// Palette captured when the swatch was picked.
    pub base_palette: Palette,
    /// Prompt typed while in the sub-mode.
    pub pending_prompt: String,
}

impl SingleColorMode {
    /// Enter the sub-mode for `palette[index]`.
    #[must_use]
    pub fn select(palette: &[HexColor], index: usize) -> Option<Self> {
        let target = palette.get(index)?;
        Some(Self {
            enabled: true,
            target_hex: Some(target.clone()),
            target_index: Some(index),
            base_palette: palette.to_vec(),
            pending_prompt: String::new(),
        })
    }

    /// Base palette for the edit: the captured one when its length matches the
    /// active palette, the active palette otherwise.
    #[must_use]
    pub fn resolve_base<'a>(&'a self, active: &'a [HexColor]) -> &'a [HexColor] {
        if !self.base_palette.is_empty() && self.base_palette.len() == active.len() {
            &self.base_palette
        } else {
            active
        }
    }

    /// Index of the target swatch in `base`.
    ///
    /// # Errors
    /// Returns an error when no target is selected or it cannot be found.
    pub fn resolve_target_index(&self, base: &[HexColor]) -> Result<usize, ValidationError> {
        if let Some(index) = self.target_index {
            return Ok(index);
        }
        let target = self.target_hex.as_ref().ok_or(ValidationError::NoTargetColor)?;
        base.iter()
            .position(|color| color == target)
            .ok_or_else(|| ValidationError::TargetNotFound(target.to_string()))
    }

    /// Default instruction when the user typed nothing.
    #[must_use]
    pub fn default_prompt(target: &HexColor) -> String {
        format!("Suggest a replacement for {target} that keeps the palette's style")
    }
}

/// The orchestrator's view of the current conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// `None` until the first generation.
    pub session_id: Option<SessionId>,
    /// First prompt of the session.
    pub theme: String,
    /// Current palette.
    pub palette: Palette,
    /// Palette before the latest generation.
    pub previous_palette: Palette,
    /// Last applied prompt.
    pub prompt: String,
    /// Latest advice.
    pub advice: String,
    /// Time of the latest generation in milliseconds.
    pub timestamp_ms: i64,
    /// Single-color edit overlay.
    pub single_color: SingleColorMode,
}

impl ActiveSession {
    /// Refine iff a session exists and its palette is complete.
    #[must_use]
    pub fn can_refine(&self) -> bool {
        self.session_id.is_some() && self.palette.len() == PALETTE_SIZE
    }

    /// Whether the id refers to this session.
    #[must_use]
    pub fn is_active(&self, id: &SessionId) -> bool {
        self.session_id.as_ref() == Some(id)
    }

    /// Theme with the fallback chain: theme, last prompt, placeholder.
    #[must_use]
    pub fn theme_or_fallback(&self) -> String {
        [self.theme.trim(), self.prompt.trim()]
            .into_iter()
            .find(|value| !value.is_empty())
            .unwrap_or(UNTITLED_THEME)
            .to_string()
    }

    /// Drop every field back to the no-session state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
