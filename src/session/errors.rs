//! Error types for configuration and user actions.

use thiserror::Error;

use crate::service::ServiceError;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// An environment override could not be parsed.
    #[error("invalid value for {key}: {value}")]
    Env {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Convenience result alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Preconditions an action checks before touching any store.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    /// Prompt was blank.
    #[error("prompt must not be empty")]
    EmptyPrompt,
    /// No palette to work on.
    #[error("no palette to choose from")]
    NoPalette,
    /// Contrast check needs a pair.
    #[error("at least two colors are required for a contrast check")]
    NotEnoughColors,
    /// Refinement and single-color edits need a full palette.
    #[error("palette must contain exactly {expected} colors, found {found}")]
    IncompletePalette {
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// Single-color regeneration without a selected swatch.
    #[error("no color selected for regeneration")]
    NoTargetColor,
    /// Target swatch could not be located in the base palette.
    #[error("target color {0} is not part of the palette")]
    TargetNotFound(String),
    /// Swatch index out of range.
    #[error("color index {index} is out of range for a palette of {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Palette length.
        len: usize,
    },
    /// A palette-level generation is already running.
    #[error("a palette generation is already in progress")]
    Busy,
}

/// Action-level error, classified by how the caller should react.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Precondition failed; nothing was mutated and no call was made.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The generation collaborator failed; an error entry was appended.
    #[error("generation service failed: {0}")]
    Service(#[from] ServiceError),
    /// Session lookup failed.
    #[error("session {0} not found")]
    NotFound(String),
}

impl ActionError {
    /// Whether the error was a precondition failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience result alias for user actions.
pub type ActionResult<T> = Result<T, ActionError>;
