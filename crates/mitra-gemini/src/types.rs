//! Wire types for the Gemini `generateContent` REST API.
//!
//! Only the fields this driver actually sends and reads are modelled;
//! unknown response fields are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation turns, oldest first.
    pub contents: Vec<Content>,

    /// The system instruction framing the whole conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Generation tuning knobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One conversation turn (or the system instruction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// `"user"` or `"model"`; absent on the system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// The parts making up this turn.
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn carrying a single text part.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn carrying a single text part.
    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// A role-less content block, used for the system instruction.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// One part of a content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary payload (images).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// A text-only part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline-data part carrying base64-encoded bytes.
    #[must_use]
    pub fn inline_data(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

/// Base64-encoded inline bytes with their MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Generation tuning knobs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Thinking configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Thinking budget configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for model reasoning before the visible reply.
    pub thinking_budget: u32,
}

/// Response body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Ranked reply candidates; the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One reply candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// The candidate's content, absent on some block reasons.
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    ///
    /// Returns an empty string when the response carries no usable text;
    /// callers substitute their own fallback for empty replies.
    #[must_use]
    pub fn first_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
