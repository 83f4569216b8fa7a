//! The seam between the session state machine and the remote model.
//!
//! The state machine drives tutoring through this trait so tests can
//! substitute a scripted backend and the Gemini implementation stays in
//! its own crate.

use async_trait::async_trait;

use crate::session::TutorConfig;

/// Remote tutoring capability as seen by the session state machine.
///
/// Every method returns display-ready text. Implementations MUST catch
/// all transport/model failures internally and return the fixed fallback
/// strings from [`crate::messages`] instead; the state machine never
/// observes an error from this boundary, only text it can append to the
/// transcript.
#[async_trait]
pub trait TutorBackend: Send {
    /// Transcribes the problem shown in an image as plain text.
    ///
    /// On failure returns [`crate::messages::EXTRACTION_FAILED`], which the
    /// caller recognizes by [`crate::messages::EXTRACTION_FAILED_MARKER`]
    /// to short-circuit the upload flow.
    async fn extract_problem(&self, image_base64: &str, mime_type: &str) -> String;

    /// Opens a fresh conversation for the given problem and returns the
    /// first guidance step.
    ///
    /// Replaces any prior conversation handle wholesale.
    async fn start_conversation(&mut self, config: &TutorConfig, problem: &str) -> String;

    /// Forwards a student turn to the active conversation and returns the
    /// tutor's reply.
    async fn continue_conversation(&mut self, user_text: &str) -> String;

    /// Discards the active conversation handle, if any.
    fn end_conversation(&mut self);
}
