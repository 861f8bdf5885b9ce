//! The palette generation collaborator.
//!
//! The engine only depends on [`PaletteService`]; [`HttpPaletteService`] talks
//! to the generation backend's JSON API.

pub mod error;
pub mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{ServiceError, ServiceResult};
pub use http::HttpPaletteService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::color::science::HexColor;
use crate::session::model::{Palette, normalise_timestamp_ms};

/// Result of any generation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Full palette.
    pub colors: Palette,
    /// Service time in seconds.
    pub timestamp: i64,
    /// Usage advice.
    #[serde(default)]
    pub advice: String,
    /// Short description of what was produced.
    #[serde(default)]
    pub description: String,
}

impl Generation {
    /// Service time in milliseconds.
    #[must_use]
    pub const fn timestamp_ms(&self) -> i64 {
        normalise_timestamp_ms(self.timestamp)
    }
}

/// Single-swatch regeneration request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SingleColorRequest {
    /// Instruction for the replacement.
    pub prompt: String,
    /// Palette the swatch belongs to.
    pub base_colors: Palette,
    /// Index of the swatch to replace.
    pub target_index: usize,
}

/// External palette generator.
#[async_trait]
pub trait PaletteService: Send + Sync {
    /// Fresh palette from a prompt.
    ///
    /// # Errors
    /// Returns an error if the backend call fails.
    async fn generate(&self, prompt: &str) -> ServiceResult<Generation>;

    /// Adjust an existing palette.
    ///
    /// # Errors
    /// Returns an error if the backend call fails.
    async fn refine(&self, current: &[HexColor], prompt: &str) -> ServiceResult<Generation>;

    /// Replace one swatch; the result is still a full palette.
    ///
    /// # Errors
    /// Returns an error if the backend call fails.
    async fn regenerate_one(&self, request: &SingleColorRequest) -> ServiceResult<Generation>;

    /// Reachability probe.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be reached.
    async fn health_check(&self) -> ServiceResult<()>;
}
