//! HTTP API integration tests.
//!
//! Boots the real axum server on an ephemeral port and drives it with
//! reqwest, the way the browser frontend would.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use mitra_tutor::{
    create_router, AppState, SessionMachine, SessionStore, TutorBackend, TutorConfig,
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

/// Starts the API server on an ephemeral port and returns its base URL.
async fn spawn_server(
    dir: &tempfile::TempDir,
    backend: ScriptedBackend,
) -> (String, AppState<ScriptedBackend>) {
    let store = SessionStore::new(dir.path().join("session.json"));
    let state = AppState::new(SessionMachine::new(backend, store));
    let router = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });

    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn test_session_endpoint_serves_initial_state() {
    let dir = tempfile::tempdir().unwrap();
    let (base, _state) = spawn_server(&dir, ScriptedBackend::default()).await;

    let body: serde_json::Value = reqwest::get(format!("{base}/api/session"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["phase"], "no_problem");
    assert_eq!(body["isSolved"], false);
    assert_eq!(body["isLoading"], false);
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
    assert_eq!(body["config"]["level"], "JNV प्रवेश परीक्षा - कक्षा 6");
}

#[tokio::test]
async fn test_image_upload_flow_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(
        ["48 ÷ 6 = ?"],
        ["पहला कदम: भाग का अर्थ समझें।"],
    );
    let (base, _state) = spawn_server(&dir, backend).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/session/image"))
        .json(&serde_json::json!({
            "imageBase64": "aW1hZ2U=",
            "mimeType": "image/png"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["problem"], "48 ÷ 6 = ?");
    assert_eq!(body["phase"], "in_progress");

    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3]["content"], "पहला कदम: भाग का अर्थ समझें।");
    // Transcript entries are fully shaped for the frontend
    assert!(history[0]["id"].is_string());
    assert!(history[0]["timestamp"].is_string());
    assert_eq!(history[0]["author"], "ai");
}

#[tokio::test]
async fn test_message_and_solved_flow_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(
        ["7 + 8 = ?"],
        ["पहला कदम", "शाबाश! उत्तर 15 है। [SOLVED]"],
    );
    let (base, _state) = spawn_server(&dir, backend).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/session/image"))
        .json(&serde_json::json!({"imageBase64": "aW1hZ2U=", "mimeType": "image/png"}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client
        .post(format!("{base}/api/session/message"))
        .json(&serde_json::json!({"text": "उत्तर 15 है"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["isSolved"], true);
    assert_eq!(body["phase"], "solved");
    let last = body["history"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["content"], "शाबाश! उत्तर 15 है।");
}

#[tokio::test]
async fn test_busy_server_returns_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (base, state) = spawn_server(&dir, ScriptedBackend::default()).await;
    let client = reqwest::Client::new();

    // Hold the machine lock to simulate an in-flight tutor call
    let guard = state.machine.lock().await;

    let response = client
        .post(format!("{base}/api/session/message"))
        .json(&serde_json::json!({"text": "नमस्ते"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("in progress"));
    drop(guard);

    // Once the lock is free the same request goes through
    let response = client
        .post(format!("{base}/api/session/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_config_update_and_lock_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(["प्रश्न"], ["पहला कदम"]);
    let (base, _state) = spawn_server(&dir, backend).await;
    let client = reqwest::Client::new();

    // Pre-problem: the level can be changed
    let response = client
        .put(format!("{base}/api/session/config"))
        .json(&serde_json::json!({"config": {"level": "JNV प्रवेश परीक्षा - कक्षा 11"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // Start a session
    client
        .post(format!("{base}/api/session/image"))
        .json(&serde_json::json!({"imageBase64": "aW1hZ2U=", "mimeType": "image/png"}))
        .send()
        .await
        .unwrap();

    // Mid-problem: the level is locked
    let response = client
        .put(format!("{base}/api/session/config"))
        .json(&serde_json::json!({"config": {"level": "JNV प्रवेश परीक्षा - कक्षा 9"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    // The config survived the rejected update
    let body: serde_json::Value = reqwest::get(format!("{base}/api/session"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["config"]["level"], "JNV प्रवेश परीक्षा - कक्षा 11");
}

#[tokio::test]
async fn test_reset_over_http_clears_session() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(["प्रश्न"], ["पहला कदम"]);
    let (base, _state) = spawn_server(&dir, backend).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/session/image"))
        .json(&serde_json::json!({"imageBase64": "aW1hZ2U=", "mimeType": "image/png"}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client
        .post(format!("{base}/api/session/reset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["phase"], "no_problem");
    assert_eq!(body["problem"], serde_json::Value::Null);
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_session_survives_server_restart() {
    let dir = tempfile::tempdir().unwrap();

    // First server: start a session
    {
        let backend = ScriptedBackend::new(["12 - 5 = ?"], ["पहला कदम"]);
        let (base, _state) = spawn_server(&dir, backend).await;
        reqwest::Client::new()
            .post(format!("{base}/api/session/image"))
            .json(&serde_json::json!({"imageBase64": "aW1hZ2U=", "mimeType": "image/png"}))
            .send()
            .await
            .unwrap();
    }

    // Second server over the same state file picks the session back up
    let (base, _state) = spawn_server(&dir, ScriptedBackend::default()).await;
    let body: serde_json::Value = reqwest::get(format!("{base}/api/session"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["problem"], "12 - 5 = ?");
    assert_eq!(body["phase"], "in_progress");
    assert_eq!(body["history"].as_array().unwrap().len(), 4);
}
