//! Domain model shared by the stores, the engine and the HTTP surface.

pub mod config;
pub mod errors;
pub mod ids;
pub mod model;
pub mod state;

pub use config::{LimitsConfig, PaletteConfig, ServerConfig, ServiceConfig, StorageConfig};
pub use errors::{
    ActionError, ActionResult, ConfigError, ConfigResult, ValidationError,
};
pub use ids::{EntryId, IdParseError, SessionId};
pub use model::{
    ChatEntry, DEFAULT_COLORS, DEFAULT_PROMPT, EntryKind, EntryPayload, GREETING,
    GenerationEvent, PALETTE_SIZE, Palette, PalettePayload, Role, SavedSession, SessionSummary,
    default_palette, now_ms,
};
pub use state::{ActiveSession, SingleColorMode, UNTITLED_THEME};
