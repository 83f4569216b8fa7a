//! The Gemini-backed [`TutorBackend`] implementation.
//!
//! This driver is the only place that talks to the network. Per the
//! backend contract it never surfaces an error to the state machine:
//! every failure is logged and replaced by a fixed Hindi fallback from
//! [`mitra_tutor::messages`], so the student always sees a friendly
//! sentence instead of a stack of transport details.

use async_trait::async_trait;
use tracing::{debug, error, info};

use mitra_tutor::config::AppConfig;
use mitra_tutor::messages;
use mitra_tutor::session::TutorConfig;
use mitra_tutor::TutorBackend;

use crate::client::GeminiClient;
use crate::error::Result;
use crate::prompt::{system_instruction, CONVERSATION_OPENER, EXTRACTION_PROMPT};
use crate::types::{
    Content, GenerateContentRequest, GenerationConfig, Part, ThinkingConfig,
};

/// An open tutoring conversation.
///
/// Gemini's REST API is stateless, so the handle carries the full turn
/// history and replays it with every request. Turns are committed to the
/// history only after a successful exchange; a failed request leaves the
/// conversation exactly where it was.
#[derive(Debug)]
struct ChatHandle {
    model: String,
    system_instruction: String,
    thinking_budget: u32,
    history: Vec<Content>,
}

impl ChatHandle {
    fn new(model: String, system_instruction: String, thinking_budget: u32) -> Self {
        Self {
            model,
            system_instruction,
            thinking_budget,
            history: Vec::new(),
        }
    }

    /// Sends one user turn and returns the model's reply text.
    ///
    /// The reply may be empty; the caller substitutes its fallback.
    async fn send(&mut self, client: &GeminiClient, user_text: &str) -> Result<String> {
        let mut contents = self.history.clone();
        contents.push(Content::user_text(user_text));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(self.system_instruction.clone())),
            generation_config: Some(GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: self.thinking_budget,
                }),
            }),
        };

        let response = client.generate(&self.model, &request).await?;
        let reply = response.first_text();

        self.history.push(Content::user_text(user_text));
        self.history.push(Content::model_text(reply.clone()));
        debug!(turns = self.history.len(), "Conversation turn committed");

        Ok(reply)
    }
}

/// Gemini-backed tutor driver.
#[derive(Debug)]
pub struct GeminiTutor {
    client: GeminiClient,
    chat: Option<ChatHandle>,
    chat_model: String,
    extraction_model: String,
    thinking_budget: u32,
}

impl GeminiTutor {
    /// Creates a driver using the models and tuning from the app config.
    #[must_use]
    pub fn new(client: GeminiClient, config: &AppConfig) -> Self {
        Self {
            client,
            chat: None,
            chat_model: config.chat_model.clone(),
            extraction_model: config.extraction_model.clone(),
            thinking_budget: config.thinking_budget,
        }
    }
}

#[async_trait]
impl TutorBackend for GeminiTutor {
    async fn extract_problem(&self, image_base64: &str, mime_type: &str) -> String {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline_data(image_base64, mime_type),
                    Part::text(EXTRACTION_PROMPT),
                ],
            }],
            system_instruction: None,
            generation_config: None,
        };

        match self.client.generate(&self.extraction_model, &request).await {
            Ok(response) => {
                let text = response.first_text();
                if text.is_empty() {
                    messages::EXTRACTION_EMPTY.to_string()
                } else {
                    info!(chars = text.chars().count(), "Problem extracted from image");
                    text
                }
            }
            Err(e) => {
                error!(error = %e, "Image extraction failed");
                messages::EXTRACTION_FAILED.to_string()
            }
        }
    }

    async fn start_conversation(&mut self, config: &TutorConfig, problem: &str) -> String {
        let instruction = system_instruction(config.level, problem);
        let mut handle = ChatHandle::new(
            self.chat_model.clone(),
            instruction,
            self.thinking_budget,
        );

        let result = handle.send(&self.client, CONVERSATION_OPENER).await;
        // The handle replaces any prior conversation even if the opening
        // exchange failed; a retry then reuses the fresh conversation.
        self.chat = Some(handle);

        match result {
            Ok(reply) if reply.is_empty() => messages::FIRST_STEP_EMPTY.to_string(),
            Ok(reply) => {
                info!(model = %self.chat_model, "Tutoring conversation started");
                reply
            }
            Err(e) => {
                error!(error = %e, "Failed to start tutoring conversation");
                messages::START_FAILED.to_string()
            }
        }
    }

    async fn continue_conversation(&mut self, user_text: &str) -> String {
        let Some(chat) = self.chat.as_mut() else {
            return messages::NO_ACTIVE_SESSION.to_string();
        };

        match chat.send(&self.client, user_text).await {
            Ok(reply) if reply.is_empty() => messages::REPLY_EMPTY.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Tutoring turn failed");
                messages::REPLY_FAILED.to_string()
            }
        }
    }

    fn end_conversation(&mut self) {
        if self.chat.take().is_some() {
            debug!("Tutoring conversation discarded");
        }
    }
}
