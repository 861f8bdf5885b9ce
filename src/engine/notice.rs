//! User-facing notifications produced by actions.

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Action completed.
    Success,
    /// Neutral information.
    Info,
    /// Precondition or lookup problem.
    Warning,
    /// Collaborator failure.
    Error,
}

/// A toast-style message waiting to be shown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text.
    pub message: String,
}

impl Notice {
    /// Build a notice.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
