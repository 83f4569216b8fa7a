//! Application configuration for the Mitra tutor server.
//!
//! This covers deployment knobs only (state file location, model names,
//! request tuning). The student-facing tutoring configuration lives in
//! [`crate::session::TutorConfig`] and is part of the session itself.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "mitra.json";

/// Default path for the persisted session blob.
fn default_state_file() -> String {
    ".mitra/session.json".to_string()
}

/// Default model for the guided tutoring conversation.
fn default_chat_model() -> String {
    "gemini-3-pro-preview".to_string()
}

/// Default model for one-shot image problem extraction.
fn default_extraction_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default thinking budget for conversation requests.
const fn default_thinking_budget() -> u32 {
    16_384
}

/// Default per-request timeout in seconds.
const fn default_request_timeout() -> u64 {
    300
}

/// Main configuration for the Mitra tutor server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Path to the persisted session state file.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Model used for the tutoring conversation.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for one-shot image problem extraction.
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Thinking budget passed with every conversation request.
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    /// Timeout for individual remote-model requests in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            chat_model: default_chat_model(),
            extraction_model: default_extraction_model(),
            thinking_budget: default_thinking_budget(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `mitra.json` in the current directory. If found, loads and
    /// validates the configuration. If not found, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            TutorError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `mitra.json` exists in the directory but
    /// contains invalid JSON or invalid values.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::ConfigParseError`] if the file exists but
    /// contains invalid JSON, and [`TutorError::ConfigValidationError`] if
    /// the parsed values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(TutorError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| TutorError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::ConfigValidationError`] if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.state_file.trim().is_empty() {
            return Err(TutorError::config_validation(
                "stateFile must not be empty",
                "Provide a valid state file path in your mitra.json",
            ));
        }

        if self.chat_model.trim().is_empty() {
            return Err(TutorError::config_validation(
                "chatModel must not be empty",
                "Provide a model name like 'gemini-3-pro-preview' in your mitra.json",
            ));
        }

        if self.extraction_model.trim().is_empty() {
            return Err(TutorError::config_validation(
                "extractionModel must not be empty",
                "Provide a model name like 'gemini-2.5-flash' in your mitra.json",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(TutorError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 second in your mitra.json",
            ));
        }

        Ok(())
    }
}
