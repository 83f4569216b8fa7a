//! HTTP API endpoints for the Mitra tutor server.
//!
//! This module provides the REST API used by the browser frontend to
//! drive a tutoring session.
//!
//! # Endpoints
//!
//! - `GET /api/session` - Get the current session view
//! - `POST /api/session/image` - Start a session from a problem image
//! - `POST /api/session/message` - Send a student message
//! - `POST /api/session/practice` - Request a practice problem
//! - `POST /api/session/reset` - Return to the pre-problem state
//! - `PUT /api/session/config` - Replace the tutoring configuration
//!
//! Mutating endpoints use `try_lock` on the shared machine: a request
//! arriving while a remote-model call is in flight gets `409 CONFLICT`
//! and is dropped, never queued. `GET /api/session` reads the machine's
//! published snapshot instead of the mutex, so a polling frontend keeps
//! seeing the transcript (including the in-flight status messages and
//! the loading flag) while a remote call is outstanding.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::backend::TutorBackend;
use crate::error::TutorError;
use crate::machine::{SessionMachine, SessionSnapshot};
use crate::session::{ChatMessage, Session, SessionPhase, TutorConfig};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the image upload endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    /// Base64-encoded image bytes, without a data-URL prefix.
    pub image_base64: String,
    /// MIME type of the image, e.g. `image/png`.
    pub mime_type: String,
}

/// Request body for the student message endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// The student's message text.
    pub text: String,
}

/// Request body for the config update endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfigRequest {
    /// The new tutoring configuration.
    pub config: TutorConfig,
}

/// Snapshot of the session returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// The tutoring configuration.
    pub config: TutorConfig,
    /// The full chat transcript.
    pub history: Vec<ChatMessage>,
    /// The extracted problem statement, if a session is active.
    pub problem: Option<String>,
    /// Whether the current problem has been solved.
    pub is_solved: bool,
    /// The derived session phase.
    pub phase: SessionPhase,
    /// Whether a remote-model call is in flight.
    pub is_loading: bool,
}

impl SessionView {
    fn new(session: &Session, is_loading: bool) -> Self {
        Self {
            config: session.config,
            history: session.history.clone(),
            problem: session.problem.clone(),
            is_solved: session.is_solved,
            phase: session.phase(),
            is_loading,
        }
    }

    fn of<B: TutorBackend>(machine: &SessionMachine<B>) -> Self {
        Self::new(machine.session(), machine.is_loading())
    }

    fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self::new(&snapshot.session, snapshot.loading)
    }
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
///
/// The session machine is behind a single mutex; holding it across the
/// remote-model await is what makes `try_lock` in the handlers act as
/// the request debounce. Reads go through the snapshot receiver, which
/// the machine updates on every mutation, so they never contend with an
/// in-flight tutor call.
#[derive(Debug)]
pub struct AppState<B> {
    /// The shared session machine.
    pub machine: Arc<Mutex<SessionMachine<B>>>,
    /// Lock-free view of the latest session state.
    pub snapshot: watch::Receiver<SessionSnapshot>,
}

// Manual impl: deriving Clone would needlessly require `B: Clone`.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<B: TutorBackend> AppState<B> {
    /// Creates a new `AppState` wrapping the given machine.
    #[must_use]
    pub fn new(machine: SessionMachine<B>) -> Self {
        let snapshot = machine.subscribe();
        Self {
            machine: Arc::new(Mutex::new(machine)),
            snapshot,
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// A remote-model call is already in flight.
    Busy,
    /// The requested change is not allowed in the current session state.
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Busy => (
                StatusCode::CONFLICT,
                "A tutor request is already in progress".to_string(),
            ),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<TutorError> for ApiError {
    fn from(e: TutorError) -> Self {
        match e {
            TutorError::Busy => Self::Busy,
            other => Self::Conflict(other.to_string()),
        }
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// # Arguments
///
/// * `state` - The shared application state
///
/// # Returns
///
/// An axum `Router` configured with:
/// - All API routes under `/api`
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router<B>(state: AppState<B>) -> Router
where
    B: TutorBackend + 'static,
{
    // Configure CORS for development (allow all origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API routes
    let api_routes = Router::new()
        .route("/session", get(handle_get_session::<B>))
        .route("/session/image", post(handle_upload_image::<B>))
        .route("/session/message", post(handle_send_message::<B>))
        .route("/session/practice", post(handle_practice_problem::<B>))
        .route("/session/reset", post(handle_reset::<B>))
        .route("/session/config", put(handle_update_config::<B>));

    // Combine with state and middleware
    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `GET /api/session`.
///
/// Returns the latest published session view without touching the
/// machine mutex, so polling keeps working while a tutor call is in
/// flight (the view then carries `isLoading: true` and whatever status
/// messages have been appended so far).
async fn handle_get_session<B: TutorBackend>(
    State(state): State<AppState<B>>,
) -> Json<SessionView> {
    let view = SessionView::from_snapshot(&state.snapshot.borrow());
    Json(view)
}

/// Handler for `POST /api/session/image`.
///
/// Resets the session and starts a new one from the uploaded image.
async fn handle_upload_image<B: TutorBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<UploadImageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    info!(
        mime_type = %request.mime_type,
        encoded_len = request.image_base64.len(),
        "Received problem image"
    );

    let mut machine = busy_guard(&state)?;
    machine
        .upload_image(&request.image_base64, &request.mime_type)
        .await;

    info!(phase = ?machine.phase(), "Image upload processed");
    Ok(Json(SessionView::of(&machine)))
}

/// Handler for `POST /api/session/message`.
///
/// Forwards the student's message to the tutor. Blank input and
/// messages sent after the problem is solved are no-ops; the response
/// still carries the (unchanged) session view.
async fn handle_send_message<B: TutorBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut machine = busy_guard(&state)?;
    machine.send_message(&request.text).await;
    Ok(Json(SessionView::of(&machine)))
}

/// Handler for `POST /api/session/practice`.
///
/// Asks the tutor for a new practice problem.
async fn handle_practice_problem<B: TutorBackend>(
    State(state): State<AppState<B>>,
) -> Result<Json<SessionView>, ApiError> {
    info!("Practice problem requested");

    let mut machine = busy_guard(&state)?;
    machine.request_practice_problem().await;
    Ok(Json(SessionView::of(&machine)))
}

/// Handler for `POST /api/session/reset`.
///
/// Returns the session to the pre-problem state, keeping the config.
async fn handle_reset<B: TutorBackend>(
    State(state): State<AppState<B>>,
) -> Result<Json<SessionView>, ApiError> {
    let mut machine = busy_guard(&state)?;
    machine.reset();
    Ok(Json(SessionView::of(&machine)))
}

/// Handler for `PUT /api/session/config`.
///
/// Replaces the tutoring configuration. Rejected with `409 CONFLICT`
/// once a problem has been extracted.
async fn handle_update_config<B: TutorBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<UpdateConfigRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut machine = busy_guard(&state)?;

    if let Err(e) = machine.update_config(request.config) {
        warn!(error = %e, "Config update rejected");
        return Err(e.into());
    }

    info!(level = %request.config.level, "Config updated");
    Ok(Json(SessionView::of(&machine)))
}

/// Acquires the machine without waiting.
///
/// A held lock means a remote-model call is in flight; the caller's
/// request is dropped with [`ApiError::Busy`].
fn busy_guard<B: TutorBackend>(
    state: &AppState<B>,
) -> Result<tokio::sync::MutexGuard<'_, SessionMachine<B>>, ApiError> {
    state.machine.try_lock().map_err(|_| {
        warn!("Dropping request: tutor call in flight");
        ApiError::Busy
    })
}

// ============================================================================
// Tests
// ============================================================================
