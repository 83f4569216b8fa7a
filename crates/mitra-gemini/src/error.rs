//! Error types for the Gemini driver.
//!
//! These never cross the [`mitra_tutor::TutorBackend`] boundary; the
//! driver logs them and substitutes the fixed Hindi fallback strings.

use thiserror::Error;

/// Errors from talking to the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Gemini API returned status {status}: {body}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The raw response body, for the log.
        body: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("failed to decode Gemini response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Convenience alias for Gemini driver results.
pub type Result<T> = std::result::Result<T, GeminiError>;
