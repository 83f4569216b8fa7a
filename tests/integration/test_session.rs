//! End-to-end session lifecycle tests.
//!
//! Drives a `SessionMachine` through full tutoring journeys with a
//! scripted backend: image upload, guided steps, solving, practice
//! problems, resets, and restart recovery.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use mitra_tutor::{
    messages, ExamLevel, MessageAuthor, SessionMachine, SessionPhase, SessionStore, TutorBackend,
    TutorConfig, TutorError,
};

/// Backend that plays back scripted replies in order.
#[derive(Debug, Default)]
struct ScriptedBackend {
    extract_replies: Mutex<VecDeque<String>>,
    chat_replies: VecDeque<String>,
}

impl ScriptedBackend {
    fn new(
        extract_replies: impl IntoIterator<Item = &'static str>,
        chat_replies: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            extract_replies: Mutex::new(
                extract_replies.into_iter().map(String::from).collect(),
            ),
            chat_replies: chat_replies.into_iter().map(String::from).collect(),
        }
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    async fn extract_problem(&self, _image_base64: &str, _mime_type: &str) -> String {
        self.extract_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "<unscripted extraction>".to_string())
    }

    async fn start_conversation(&mut self, _config: &TutorConfig, _problem: &str) -> String {
        self.chat_replies
            .pop_front()
            .unwrap_or_else(|| "<unscripted start>".to_string())
    }

    async fn continue_conversation(&mut self, _user_text: &str) -> String {
        self.chat_replies
            .pop_front()
            .unwrap_or_else(|| "<unscripted reply>".to_string())
    }

    fn end_conversation(&mut self) {}
}

fn machine_in(
    dir: &tempfile::TempDir,
    backend: ScriptedBackend,
) -> SessionMachine<ScriptedBackend> {
    let store = SessionStore::new(dir.path().join("session.json"));
    SessionMachine::new(backend, store)
}

#[tokio::test]
async fn test_full_tutoring_journey() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(
        ["15 + 27 कितना होता है?"],
        [
            // start_conversation after upload
            "पहला कदम: इकाई के अंक जोड़ें।",
            // two guidance turns
            "बहुत अच्छे! अब दहाई के अंक जोड़ें।",
            "शाबाश! आपने प्रश्न हल कर लिया। उत्तर 42 है। [SOLVED]",
        ],
    );
    let mut machine = machine_in(&dir, backend);

    // Upload the problem image
    machine.upload_image("aW1hZ2U=", "image/png").await;
    assert_eq!(machine.phase(), SessionPhase::InProgress);
    assert_eq!(
        machine.session().problem.as_deref(),
        Some("15 + 27 कितना होता है?")
    );

    // Work through the steps
    machine.send_message("7 और 5 बारह होते हैं").await;
    assert_eq!(machine.phase(), SessionPhase::InProgress);

    machine.send_message("उत्तर 42 है!").await;
    assert_eq!(machine.phase(), SessionPhase::Solved);
    assert!(machine.session().is_solved);

    // The solved marker never reaches the transcript
    let last = machine.session().history.last().unwrap();
    assert_eq!(last.content, "शाबाश! आपने प्रश्न हल कर लिया। उत्तर 42 है।");
    assert!(!last.content.contains("[SOLVED]"));

    // Further messages are dropped once solved
    let len_before = machine.session().history.len();
    machine.send_message("और एक कदम?").await;
    assert_eq!(machine.session().history.len(), len_before);
}

#[tokio::test]
async fn test_practice_problem_after_solving() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(
        ["8 × 4 = ?"],
        [
            "पहला कदम: गुणा को बार-बार जोड़ समझें।",
            "शाबाश! [SOLVED]",
            "[NEW_PROBLEM]आपका नया प्रश्न है: 9 × 3 = ?[/NEW_PROBLEM]",
            "पहला कदम: 9 को तीन बार जोड़ें।",
        ],
    );
    let mut machine = machine_in(&dir, backend);

    machine.upload_image("aW1hZ2U=", "image/png").await;
    machine.send_message("उत्तर 32 है").await;
    assert!(machine.session().is_solved);

    // Practice problem is accepted despite the solved state
    machine.request_practice_problem().await;

    let session = machine.session();
    assert_eq!(session.problem.as_deref(), Some("आपका नया प्रश्न है: 9 × 3 = ?"));
    assert!(!session.is_solved);
    assert_eq!(machine.phase(), SessionPhase::InProgress);

    // The transcript was rebuilt for the new problem
    let contents: Vec<&str> = session
        .history
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec![
            messages::new_problem_acknowledgment("आपका नया प्रश्न है: 9 × 3 = ?").as_str(),
            messages::PREPARING_NEXT_STEP,
            "पहला कदम: 9 को तीन बार जोड़ें।",
        ]
    );
}

#[tokio::test]
async fn test_failed_extraction_then_successful_retry() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(
        [
            // First upload fails, second succeeds
            "माफ़ कीजिए, मुझे चित्र में दिया गया प्रश्न समझ नहीं आया। कृपया कोई दूसरा प्रयास करें।",
            "त्रिभुज का क्षेत्रफल निकालें।",
        ],
        ["पहला कदम: आधार और ऊँचाई पहचानें।"],
    );
    let mut machine = machine_in(&dir, backend);

    machine.upload_image("YmFk", "image/jpeg").await;
    assert_eq!(machine.phase(), SessionPhase::NoProblem);
    assert!(machine.session().problem.is_none());

    machine.upload_image("YmV0dGVy", "image/png").await;
    assert_eq!(machine.phase(), SessionPhase::InProgress);
    assert_eq!(
        machine.session().problem.as_deref(),
        Some("त्रिभुज का क्षेत्रफल निकालें।")
    );
    // The failed attempt's transcript was replaced by the new upload
    assert_eq!(
        machine.session().history[0].content,
        messages::ANALYZING_IMAGE
    );
}

#[tokio::test]
async fn test_restart_resumes_mid_problem() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));

    // First process: set a level, upload, exchange one turn
    {
        let backend = ScriptedBackend::new(
            ["100 का 25% क्या है?"],
            ["पहला कदम: प्रतिशत का अर्थ समझें।", "अब 100 को 4 से भाग दें।"],
        );
        let mut machine = SessionMachine::new(backend, store.clone());
        machine
            .update_config(TutorConfig {
                level: ExamLevel::Class9,
            })
            .unwrap();
        machine.upload_image("aW1hZ2U=", "image/png").await;
        machine.send_message("समझ गया").await;
    }

    // Second process: rehydrates the full session from disk
    let machine = SessionMachine::new(ScriptedBackend::default(), store);
    let session = machine.session();
    assert_eq!(session.config.level, ExamLevel::Class9);
    assert_eq!(session.problem.as_deref(), Some("100 का 25% क्या है?"));
    assert!(!session.is_solved);
    assert_eq!(session.history.len(), 6);
    assert_eq!(machine.phase(), SessionPhase::InProgress);
    assert_eq!(
        session.history.last().unwrap().content,
        "अब 100 को 4 से भाग दें।"
    );
}

#[tokio::test]
async fn test_corrupt_state_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    std::fs::write(store.path(), "not json at all").unwrap();

    let machine = SessionMachine::new(ScriptedBackend::default(), store);
    assert_eq!(machine.phase(), SessionPhase::NoProblem);
    assert!(machine.session().history.is_empty());
}

#[tokio::test]
async fn test_config_locked_during_problem_unlocked_after_reset() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(["प्रश्न"], ["पहला कदम"]);
    let mut machine = machine_in(&dir, backend);

    machine.upload_image("aW1hZ2U=", "image/png").await;
    let err = machine
        .update_config(TutorConfig {
            level: ExamLevel::Class11,
        })
        .unwrap_err();
    assert!(matches!(err, TutorError::SessionActive));

    machine.reset();
    machine
        .update_config(TutorConfig {
            level: ExamLevel::Class11,
        })
        .unwrap();
    assert_eq!(machine.session().config.level, ExamLevel::Class11);
}

#[tokio::test]
async fn test_user_turns_carry_author_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(["प्रश्न"], ["कदम 1", "कदम 2"]);
    let mut machine = machine_in(&dir, backend);

    machine.upload_image("aW1hZ2U=", "image/png").await;
    machine.send_message("ठीक है").await;

    let history = &machine.session().history;
    // analyzing, acknowledgment, preparing, step 1, user, step 2
    assert_eq!(history.len(), 6);
    assert_eq!(history[4].author, MessageAuthor::User);
    assert_eq!(history[4].content, "ठीक है");
    assert_eq!(history[5].author, MessageAuthor::Tutor);

    // Every message has a distinct id
    let mut ids: Vec<_> = history.iter().map(|m| m.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), history.len());
}
