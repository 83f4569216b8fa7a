//! Core tutoring engine for Mitra, a guided Hindi maths tutor for
//! Jawahar Navodaya Vidyalaya entrance-exam students.
//!
//! This crate owns the session data model, the sentinel protocol spoken
//! by the remote tutor, the state machine driving a session, file-backed
//! persistence, and the HTTP API. The remote model itself is reached
//! through the [`TutorBackend`] trait; the Gemini implementation lives
//! in the `mitra-gemini` crate.
//!
//! # Architecture
//!
//! ```text
//! HTTP API (axum)
//!     │
//!     ▼
//! SessionMachine ──► TutorBackend (trait; Gemini in mitra-gemini)
//!     │
//!     ▼
//! SessionStore (JSON file)
//! ```
//!
//! Every state mutation flows through [`SessionMachine`] and is
//! persisted before the operation returns, so a restart resumes the
//! session mid-problem.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod machine;
pub mod messages;
pub mod protocol;
pub mod session;
pub mod store;

pub use api::{AppState, SessionView, create_router};
pub use backend::TutorBackend;
pub use config::AppConfig;
pub use error::{Result, TutorError};
pub use machine::{SessionMachine, SessionSnapshot};
pub use protocol::{TutorSignal, parse_tutor_reply};
pub use session::{
    ChatMessage, ExamLevel, MessageAuthor, Session, SessionPhase, TutorConfig,
};
pub use store::SessionStore;
