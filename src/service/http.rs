//! HTTP client for the palette generation backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::color::science::HexColor;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{Generation, PaletteService, SingleColorRequest};
use crate::session::config::ServiceConfig;

/// Reachability endpoint.
pub const HEALTH_PATH: &str = "/api/health";
/// Fresh palette endpoint.
pub const GENERATE_PATH: &str = "/api/generate-palette";
/// Refinement endpoint.
pub const REFINE_PATH: &str = "/api/refine-palette";
/// Single-swatch endpoint.
pub const SINGLE_COLOR_PATH: &str = "/api/regenerate-single-color";

/// Longest error body kept in [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct RefineBody<'a> {
    current_colors: &'a [HexColor],
    prompt: &'a str,
}

/// [`PaletteService`] backed by the generation backend's REST API.
pub struct HttpPaletteService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPaletteService {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(config: &ServiceConfig) -> ServiceResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ServiceError::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ServiceResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn post<B>(&self, path: &str, body: &B) -> ServiceResult<Generation>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!("POST {url}");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let generation: Generation = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedPalette(e.to_string()))?;
        if generation.colors.is_empty() {
            return Err(ServiceError::MalformedPalette(
                "response contains no colors".to_string(),
            ));
        }
        Ok(generation)
    }
}

#[async_trait]
impl PaletteService for HttpPaletteService {
    async fn generate(&self, prompt: &str) -> ServiceResult<Generation> {
        self.post(GENERATE_PATH, &GenerateBody { prompt }).await
    }

    async fn refine(&self, current: &[HexColor], prompt: &str) -> ServiceResult<Generation> {
        self.post(
            REFINE_PATH,
            &RefineBody {
                current_colors: current,
                prompt,
            },
        )
        .await
    }

    async fn regenerate_one(&self, request: &SingleColorRequest) -> ServiceResult<Generation> {
        self.post(SINGLE_COLOR_PATH, request).await
    }

    async fn health_check(&self) -> ServiceResult<()> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Unavailable(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }
}
