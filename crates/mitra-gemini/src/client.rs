//! Thin HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{GeminiError, Result};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Default base URL of the Gemini REST API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for the Gemini API.
///
/// The API key is held as a [`SecretString`] so it never shows up in
/// debug output or logs.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the given API key and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL. Used to point at a local test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Calls `models/{model}:generateContent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] on transport failure,
    /// [`GeminiError::Api`] on a non-success status, and
    /// [`GeminiError::Decode`] if the body is not the expected shape.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        debug!(model, turns = request.contents.len(), "Calling Gemini");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(GeminiError::Decode)
    }
}
