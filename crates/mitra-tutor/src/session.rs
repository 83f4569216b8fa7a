//! Session types for the Mitra tutor core.
//!
//! This module defines the canonical tutoring session state: the exam
//! level configuration, the chat transcript, the current problem, and the
//! solved flag, plus the phase derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages;

// ============================================================================
// ExamLevel and TutorConfig
// ============================================================================

/// Target exam level for the tutoring session.
///
/// The set is closed: persisted sessions carrying any other level string
/// fail deserialization and are discarded at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExamLevel {
    /// JNV entrance exam, class 6 (default).
    #[default]
    Class6,
    /// JNV entrance exam, class 9.
    Class9,
    /// JNV entrance exam, class 11.
    Class11,
}

impl ExamLevel {
    /// All valid exam levels, in display order.
    pub const ALL: [Self; 3] = [Self::Class6, Self::Class9, Self::Class11];

    /// Returns the Hindi display string for this level.
    ///
    /// This exact string is shown to the student, embedded in the system
    /// instruction, and used as the serialized form.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Class6 => "JNV प्रवेश परीक्षा - कक्षा 6",
            Self::Class9 => "JNV प्रवेश परीक्षा - कक्षा 9",
            Self::Class11 => "JNV प्रवेश परीक्षा - कक्षा 11",
        }
    }

    /// Parses a display string into an `ExamLevel`.
    #[must_use]
    pub fn from_display_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.display_name() == s)
    }
}

impl std::fmt::Display for ExamLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for ExamLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_display_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognized exam level '{s}'"))
        })
    }
}

impl Serialize for ExamLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.display_name())
    }
}

/// Student-selected tutoring configuration.
///
/// Immutable once a problem is active; preserved across session resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorConfig {
    /// The exam level the student is preparing for.
    pub level: ExamLevel,
}

// ============================================================================
// ChatMessage
// ============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageAuthor {
    /// The student.
    #[serde(rename = "user")]
    User,
    /// The tutor (model output or a fixed status/fallback message).
    #[serde(rename = "ai")]
    Tutor,
}

/// A single transcript entry.
///
/// Messages are append-only; the whole transcript may be cleared on a
/// new-problem transition but individual messages are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier; serialized as its hyphenated string form.
    pub id: Uuid,
    /// Who authored the message.
    pub author: MessageAuthor,
    /// Message text; may contain markdown.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(author: MessageAuthor, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// SessionPhase
// ============================================================================

/// Phase of the tutoring session, derived from session contents.
///
/// The phase transitions through:
/// - `NoProblem` -> `AwaitingFirstStep` (problem extracted, guidance pending)
/// - `AwaitingFirstStep` -> `InProgress` (first step appended)
/// - `InProgress` -> `Solved` (solved sentinel received)
/// - `Solved` -> `AwaitingFirstStep` (practice problem handed out)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No problem has been extracted yet.
    NoProblem,
    /// Problem known, first guidance step pending.
    AwaitingFirstStep,
    /// Guidance steps are being exchanged.
    InProgress,
    /// The problem is solved; only reset or a practice-problem request follow.
    Solved,
}

// ============================================================================
// Session
// ============================================================================

/// Complete tutoring session state for one student-problem lifecycle.
///
/// This is the unit of persistence: the serialized blob is exactly
/// `{config, history, problem, isSolved}` in camelCase, matching the
/// browser app's stored session format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Student-selected configuration; survives resets.
    pub config: TutorConfig,
    /// Ordered chat transcript as rendered to the student.
    pub history: Vec<ChatMessage>,
    /// The active problem statement, if one has been extracted.
    pub problem: Option<String>,
    /// Whether the active problem has been solved.
    pub is_solved: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a fresh pre-session state with default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: TutorConfig {
                level: ExamLevel::Class6,
            },
            history: Vec::new(),
            problem: None,
            is_solved: false,
        }
    }

    /// Creates a fresh session that keeps the given configuration.
    #[must_use]
    pub const fn with_config(config: TutorConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
            problem: None,
            is_solved: false,
        }
    }

    /// Appends a message to the transcript and returns its id.
    pub fn push_message(&mut self, author: MessageAuthor, content: impl Into<String>) -> Uuid {
        let message = ChatMessage::new(author, content);
        let id = message.id;
        self.history.push(message);
        id
    }

    /// Returns the derived phase of the session.
    ///
    /// `AwaitingFirstStep` is recognized by the trailing "preparing first
    /// step" status message; once guidance text follows it, the session is
    /// `InProgress`.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.problem.is_none() {
            return SessionPhase::NoProblem;
        }
        if self.is_solved {
            return SessionPhase::Solved;
        }
        match self.history.last() {
            Some(last)
                if last.content == messages::PREPARING_FIRST_STEP
                    || last.content == messages::PREPARING_NEXT_STEP =>
            {
                SessionPhase::AwaitingFirstStep
            }
            _ => SessionPhase::InProgress,
        }
    }

    /// Returns `true` if a problem is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.problem.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
