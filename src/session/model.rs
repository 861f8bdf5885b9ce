//! Records exchanged between the orchestrator, the stores and the render layer.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::color::analysis::{ColorblindReport, ContrastReport};
use crate::color::science::HexColor;
use crate::session::ids::{EntryId, SessionId};

/// Number of swatches in a complete palette.
pub const PALETTE_SIZE: usize = 5;

/// Ordered list of swatches. Refinement and single-color edits require exactly
/// [`PALETTE_SIZE`] entries.
pub type Palette = Vec<HexColor>;

/// Palette shown before anything has been generated.
pub const DEFAULT_COLORS: [&str; PALETTE_SIZE] =
    ["#FFC2C2", "#FFE0C2", "#FEFFD6", "#D9FFCC", "#B9F9FF"];

/// Prompt paired with [`DEFAULT_COLORS`].
pub const DEFAULT_PROMPT: &str = "Default palette";

/// First assistant entry of every fresh transcript.
pub const GREETING: &str = "Hello! I am PaletteFlow. Describe the colors you need and I will \
     generate a palette along with usage advice.";

/// Parsed [`DEFAULT_COLORS`].
#[must_use]
pub fn default_palette() -> Palette {
    DEFAULT_COLORS
        .iter()
        .filter_map(|value| HexColor::parse(value).ok())
        .collect()
}

/// Whether a palette is complete.
#[must_use]
pub const fn is_complete(palette: &[HexColor]) -> bool {
    palette.len() == PALETTE_SIZE
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Author of a chat entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Typed by the user.
    User,
    /// Produced by the assistant.
    Assistant,
}

impl Role {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(value.to_string()),
        }
    }
}

/// What a chat entry renders as.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Plain text bubble.
    Text,
    /// Palette card.
    Palette,
    /// Contrast matrix.
    Contrast,
    /// Colorblind simulation.
    Colorblind,
}

/// Palette card contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PalettePayload {
    /// Card heading.
    pub title: String,
    /// Swatches shown on the card.
    pub colors: Palette,
    /// Prompt that produced the palette, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Usage advice.
    #[serde(default)]
    pub advice: String,
}

/// Structured data attached to a non-text entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPayload {
    /// Palette card.
    Palette(PalettePayload),
    /// Contrast matrix.
    Contrast(ContrastReport),
    /// Colorblind simulation.
    Colorblind(ColorblindReport),
}

/// One line of the chat transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Unique within a transcript.
    pub id: EntryId,
    /// Author.
    pub role: Role,
    /// Rendering kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Text content for `text` entries.
    #[serde(default)]
    pub content: Option<String>,
    /// Structured payload for the other kinds.
    #[serde(default)]
    pub payload: Option<EntryPayload>,
    /// Creation time in milliseconds.
    #[serde(default, rename = "createdAt")]
    pub created_at_ms: i64,
}

impl ChatEntry {
    fn new(
        role: Role,
        kind: EntryKind,
        content: Option<String>,
        payload: Option<EntryPayload>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            role,
            kind,
            content,
            payload,
            created_at_ms: now_ms(),
        }
    }

    /// A user prompt.
    #[must_use]
    pub fn user_text(content: impl Into<String>) -> Self {
        Self::new(Role::User, EntryKind::Text, Some(content.into()), None)
    }

    /// The greeting that opens a fresh transcript.
    #[must_use]
    pub fn greeting() -> Self {
        Self::assistant_text(GREETING)
    }

    /// An assistant text reply (greetings, failures).
    #[must_use]
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, EntryKind::Text, Some(content.into()), None)
    }

    /// An assistant palette card.
    #[must_use]
    pub fn assistant_palette(payload: PalettePayload) -> Self {
        Self::new(
            Role::Assistant,
            EntryKind::Palette,
            None,
            Some(EntryPayload::Palette(payload)),
        )
    }

    /// An assistant contrast matrix.
    #[must_use]
    pub fn assistant_contrast(report: ContrastReport) -> Self {
        Self::new(
            Role::Assistant,
            EntryKind::Contrast,
            None,
            Some(EntryPayload::Contrast(report)),
        )
    }

    /// An assistant colorblind simulation.
    #[must_use]
    pub fn assistant_colorblind(report: ColorblindReport) -> Self {
        Self::new(
            Role::Assistant,
            EntryKind::Colorblind,
            None,
            Some(EntryPayload::Colorblind(report)),
        )
    }

    /// Palette colors carried by a palette entry.
    #[must_use]
    pub fn palette_colors(&self) -> Option<&[HexColor]> {
        match (&self.kind, &self.payload) {
            (EntryKind::Palette, Some(EntryPayload::Palette(payload))) => Some(&payload.colors),
            _ => None,
        }
    }
}

/// History index record, one per session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    /// Session the event belongs to.
    pub id: SessionId,
    /// Session theme.
    pub prompt: String,
    /// Prompt applied by the latest generation.
    #[serde(default)]
    pub current_prompt: String,
    /// Palette produced.
    pub colors: Palette,
    /// Service-provided timestamp in seconds.
    pub timestamp: i64,
    /// Usage advice.
    #[serde(default)]
    pub advice: String,
}

/// Durable snapshot of a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    /// Session id.
    pub id: SessionId,
    /// Theme (first prompt).
    #[serde(default)]
    pub theme: String,
    /// Recency key; milliseconds (older records may hold seconds).
    #[serde(default)]
    pub timestamp: i64,
    /// Latest palette.
    #[serde(default, alias = "currentColors")]
    pub colors: Palette,
    /// Last applied prompt.
    #[serde(default)]
    pub prompt: String,
    /// Latest advice.
    #[serde(default)]
    pub advice: String,
    /// Transcript snapshot.
    #[serde(default)]
    pub messages: Vec<ChatEntry>,
}

impl SavedSession {
    /// Timestamp in milliseconds, scaling second-based values.
    #[must_use]
    pub const fn timestamp_ms(&self) -> i64 {
        normalise_timestamp_ms(self.timestamp)
    }

    /// Lightweight listing view.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            theme: self.theme.clone(),
            timestamp: self.timestamp_ms(),
            colors: self.colors.clone(),
        }
    }
}

/// Values under this are treated as seconds.
const MILLIS_CUTOFF: i64 = 1_000_000_000_000;

/// Scale a second-based timestamp to milliseconds; millisecond values pass through.
#[must_use]
pub const fn normalise_timestamp_ms(raw: i64) -> i64 {
    if raw > MILLIS_CUTOFF { raw } else { raw.saturating_mul(1000) }
}

/// Saved-session listing entry for the history panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session id.
    pub id: SessionId,
    /// Theme.
    pub theme: String,
    /// Recency key in milliseconds.
    pub timestamp: i64,
    /// Latest palette.
    pub colors: Palette,
}
