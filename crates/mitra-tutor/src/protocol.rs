//! Sentinel protocol parser for tutor replies.
//!
//! The remote tutor embeds control signals as fixed textual markers inside
//! otherwise free-form Hindi guidance. This module classifies a raw reply
//! into a [`TutorSignal`] with a single pure function so the protocol can
//! be tested without any network call.

/// Start marker wrapping a practice-problem payload.
pub const NEW_PROBLEM_START: &str = "[NEW_PROBLEM]";

/// End marker closing a practice-problem payload.
pub const NEW_PROBLEM_END: &str = "[/NEW_PROBLEM]";

/// Marker appended to the final message of a solved problem.
pub const SOLVED_MARKER: &str = "[SOLVED]";

/// Placeholder problem statement used when the new-problem wrapper is
/// present but its payload cannot be extracted.
pub const NEW_PROBLEM_PLACEHOLDER: &str = "एक नया प्रश्न";

/// Parsed classification of a tutor reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorSignal {
    /// Plain guidance text; append verbatim, no state-flag change.
    Plain(String),
    /// A new practice problem; the payload is the problem statement.
    NewProblem(String),
    /// The problem is solved; the payload is the reply with the marker
    /// stripped and surrounding whitespace trimmed.
    Solved(String),
}

/// Classifies raw tutor reply text into a [`TutorSignal`].
///
/// The new-problem wrapper takes precedence over the solved marker; both
/// are detected anywhere in the text, not just as prefix or suffix.
/// Malformed input never panics: an unterminated wrapper falls back to
/// [`NEW_PROBLEM_PLACEHOLDER`] as the problem statement.
#[must_use]
pub fn parse_tutor_reply(text: &str) -> TutorSignal {
    if text.contains(NEW_PROBLEM_START) {
        return TutorSignal::NewProblem(extract_new_problem(text));
    }

    if text.contains(SOLVED_MARKER) {
        let cleaned = text.replacen(SOLVED_MARKER, "", 1).trim().to_string();
        return TutorSignal::Solved(cleaned);
    }

    TutorSignal::Plain(text.to_string())
}

/// Extracts the payload between the new-problem markers.
///
/// The payload may span multiple lines. Falls back to the placeholder
/// when the end marker is missing or the span is empty.
fn extract_new_problem(text: &str) -> String {
    use regex::Regex;

    // Dot-matches-newline so multi-line problem statements survive.
    let Ok(re) = Regex::new(r"(?s)\[NEW_PROBLEM\](.*)\[/NEW_PROBLEM\]") else {
        return NEW_PROBLEM_PLACEHOLDER.to_string();
    };

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|payload| payload.as_str().to_string())
        .filter(|payload| !payload.is_empty())
        .unwrap_or_else(|| NEW_PROBLEM_PLACEHOLDER.to_string())
}
