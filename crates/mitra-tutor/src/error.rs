//! Error types for the Mitra tutor core.
//!
//! This module defines the error hierarchy for all core operations,
//! including app configuration loading, persisted session recovery, and
//! state machine preconditions.

use std::path::PathBuf;

/// A specialized `Result` type for Mitra tutor operations.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur in the tutor core.
///
/// Error variants include actionable suggestions where possible to help
/// users resolve issues. Remote-model failures are deliberately absent:
/// the backend boundary converts those into user-facing fallback text
/// and never surfaces them as errors (see the `backend` module).
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the app configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your mitra.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Persisted Session Errors
    // ========================================================================
    /// Persisted session blob could not be parsed or validated.
    ///
    /// Recovery is automatic at load time: the corrupt blob is discarded
    /// and a default session is substituted. This variant exists so the
    /// parse-and-validate step is independently testable.
    #[error("Corrupted session state '{path}': {message}\n\nSuggestion: Remove the state file to start fresh")]
    StateFileCorrupted {
        /// Path to the corrupted state file.
        path: PathBuf,
        /// Description of the corruption.
        message: String,
    },

    // ========================================================================
    // State Machine Preconditions
    // ========================================================================
    /// Configuration edits are only allowed before a problem is active.
    #[error("Cannot update config while a problem is active\n\nSuggestion: Reset the session first")]
    SessionActive,

    /// A remote call is already in flight; the operation was dropped.
    #[error("A tutor operation is already in progress\n\nSuggestion: Wait for the current step to finish and retry")]
    Busy,

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TutorError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `StateFileCorrupted` error.
    #[must_use]
    pub fn state_corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateFileCorrupted {
            path: path.into(),
            message: message.into(),
        }
    }
}
