//! Error types for the generation service client.

use thiserror::Error;

/// Errors returned by a [`PaletteService`](super::PaletteService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("Service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Backend answered with an unusable palette.
    #[error("Malformed palette response: {0}")]
    MalformedPalette(String),

    /// Backend could not be reached or refused the request.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Convenience result alias for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
