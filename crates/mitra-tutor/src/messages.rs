//! Fixed user-facing transcript strings.
//!
//! Everything the tutor core or the remote-model driver appends to the
//! transcript outside of live model output comes from this module, so the
//! state machine can recognize driver fallbacks (notably the image
//! extraction failure sentinel) by exact text.
//!
//! These strings are part of the product surface; they must not be
//! reworded casually.

/// Status message appended while an uploaded image is being analyzed.
pub const ANALYZING_IMAGE: &str = "चित्र का विश्लेषण किया जा रहा है... 🧐";

/// Marker sentence identifying a failed image extraction.
///
/// The extractor's failure fallback contains this sentence; the state
/// machine checks for it to short-circuit the upload flow.
pub const EXTRACTION_FAILED_MARKER: &str =
    "माफ़ कीजिए, मुझे चित्र में दिया गया प्रश्न समझ नहीं आया।";

/// Full fallback returned by the extractor on any transport/model error.
pub const EXTRACTION_FAILED: &str =
    "माफ़ कीजिए, मुझे चित्र में दिया गया प्रश्न समझ नहीं आया। कृपया कोई दूसरा प्रयास करें।";

/// Fallback returned by the extractor when the model reply is empty.
pub const EXTRACTION_EMPTY: &str = "छवि से पाठ नहीं निकाला जा सका।";

/// Status message appended after the problem text has been recorded.
pub const PREPARING_FIRST_STEP: &str =
    "चलिए इसे मिलकर हल करते हैं! मैं आपके लिए पहला कदम तैयार कर रहा हूँ... 🤔";

/// Status message appended while the first step of a practice problem is prepared.
pub const PREPARING_NEXT_STEP: &str = "मैं पहला कदम तैयार कर रहा हूँ... 🤔";

/// Canonical user turn sent when the student asks for a practice problem.
pub const PRACTICE_PROBLEM_REQUEST: &str =
    "कृपया मुझे पिछले प्रश्न से संबंधित एक नया अभ्यास प्रश्न दें।";

/// Greeting fallback when the first conversation reply is empty.
pub const FIRST_STEP_EMPTY: &str = "नमस्ते! चलिए शुरू करते हैं।";

/// Apology fallback when starting the conversation fails.
pub const START_FAILED: &str =
    "पहला कदम तैयार करने में कुछ समस्या हुई। कृपया प्रश्न को फिर से अपलोड करने का प्रयास करें।";

/// Reply when a turn is sent with no active conversation.
pub const NO_ACTIVE_SESSION: &str =
    "कोई सक्रिय ट्यूटरिंग सत्र नहीं है। कृपया पहले एक प्रश्न अपलोड करें।";

/// Fallback when a conversation reply is empty.
pub const REPLY_EMPTY: &str = "मुझे खेद है, मैं जवाब नहीं दे पाया।";

/// Apology fallback when forwarding a turn fails.
pub const REPLY_FAILED: &str =
    "मुझे एक समस्या का सामना करना पड़ा। कृपया अपना संदेश फिर से भेजने का प्रयास करें।";

/// Acknowledgment appended after an uploaded problem is extracted.
#[must_use]
pub fn problem_acknowledgment(problem: &str) -> String {
    format!("ठीक है, मुझे प्रश्न मिल गया है:\n\n**{problem}**")
}

/// Acknowledgment appended when the tutor hands out a practice problem.
#[must_use]
pub fn new_problem_acknowledgment(problem: &str) -> String {
    format!("बहुत अच्छे! आपके लिए यह रहा नया प्रश्न:\n\n**{problem}**")
}
