//! The session state machine.
//!
//! [`SessionMachine`] owns the canonical session, the remote-model
//! backend, and the persistence store. All mutation flows through its
//! operations; each operation persists the session before returning.
//!
//! Concurrency model: a single logical thread of control. The `loading`
//! flag guards every mutating operation; a call arriving while a remote
//! call is in flight is dropped, never queued. The HTTP layer enforces
//! the same debounce across requests with `Mutex::try_lock`.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::TutorBackend;
use crate::error::{Result, TutorError};
use crate::messages;
use crate::protocol::{parse_tutor_reply, TutorSignal};
use crate::session::{MessageAuthor, Session, SessionPhase, TutorConfig};
use crate::store::SessionStore;

/// Point-in-time view of the session, published on every mutation.
///
/// Readers (the HTTP session view, most importantly) observe the machine
/// through this snapshot instead of locking the machine itself, so the
/// transcript stays renderable while a remote call is in flight — the
/// "analyzing image" and "preparing first step" status messages exist
/// precisely to be shown during that window.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// The session as of the latest mutation.
    pub session: Session,
    /// Whether a remote call was in flight when this snapshot was taken.
    pub loading: bool,
}

/// Orchestrator for one tutoring session.
#[derive(Debug)]
pub struct SessionMachine<B> {
    session: Session,
    backend: B,
    store: SessionStore,
    loading: bool,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<B: TutorBackend> SessionMachine<B> {
    /// Creates a machine, rehydrating the session from the store.
    ///
    /// A missing or corrupt persisted session falls back to the default;
    /// construction never fails because of bad stored state.
    #[must_use]
    pub fn new(backend: B, store: SessionStore) -> Self {
        let session = store.load();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            session: session.clone(),
            loading: false,
        });
        Self {
            session,
            backend,
            store,
            loading: false,
            snapshot_tx,
        }
    }

    /// Returns the current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns `true` while a remote call is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the derived session phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Returns a receiver for session snapshots.
    ///
    /// The receiver is updated on every mutation, including the
    /// intermediate status messages appended before a remote call, and
    /// can be read without taking any lock on the machine.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Starts a session from an uploaded problem image.
    ///
    /// Resets the session first (keeping the config), then extracts the
    /// problem text and begins the guidance conversation. If extraction
    /// reports the recognized failure sentinel, the failure message is
    /// appended and the session stays in `NoProblem`. Dropped while a
    /// remote call is already in flight.
    pub async fn upload_image(&mut self, image_base64: &str, mime_type: &str) {
        if self.loading {
            debug!("Dropping image upload: remote call in flight");
            return;
        }
        self.set_loading(true);

        self.session = Session::with_config(self.session.config);
        self.append_tutor(messages::ANALYZING_IMAGE);
        self.persist();

        let problem_text = self.backend.extract_problem(image_base64, mime_type).await;

        if problem_text.contains(messages::EXTRACTION_FAILED_MARKER) {
            info!("Image extraction failed, session stays pre-problem");
            self.append_tutor(problem_text);
            self.persist();
            self.set_loading(false);
            return;
        }

        info!(chars = problem_text.chars().count(), "Problem extracted from image");
        self.session.problem = Some(problem_text.clone());
        self.append_tutor(messages::problem_acknowledgment(&problem_text));
        self.append_tutor(messages::PREPARING_FIRST_STEP);
        self.persist();

        let first_step = self
            .backend
            .start_conversation(&self.session.config, &problem_text)
            .await;
        self.apply_reply(first_step).await;
        self.persist();

        self.set_loading(false);
    }

    /// Forwards a student message to the tutor.
    ///
    /// No-op on blank input, while a remote call is in flight, or once the
    /// problem is solved.
    pub async fn send_message(&mut self, text: &str) {
        if self.session.is_solved {
            debug!("Dropping message: problem already solved");
            return;
        }
        self.forward_message(text).await;
    }

    /// Asks the tutor for a new practice problem.
    ///
    /// Sends the canonical request string; unlike [`Self::send_message`]
    /// this is accepted while the problem is solved, since that is exactly
    /// when a practice problem is requested.
    pub async fn request_practice_problem(&mut self) {
        self.forward_message(messages::PRACTICE_PROBLEM_REQUEST).await;
    }

    /// Returns the session to the pre-problem state.
    ///
    /// Preserves the config; discards transcript, problem, solved flag,
    /// and the conversation handle.
    pub fn reset(&mut self) {
        info!("Resetting session");
        self.session = Session::with_config(self.session.config);
        self.backend.end_conversation();
        self.persist();
    }

    /// Replaces the tutoring configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::Busy`] while a remote call is in flight and
    /// [`TutorError::SessionActive`] once a problem has been extracted.
    pub fn update_config(&mut self, config: TutorConfig) -> Result<()> {
        if self.loading {
            return Err(TutorError::Busy);
        }
        if self.session.is_active() {
            return Err(TutorError::SessionActive);
        }
        self.session.config = config;
        self.persist();
        Ok(())
    }

    /// Shared body of [`Self::send_message`] and
    /// [`Self::request_practice_problem`]: append the user turn, forward
    /// it, and apply whatever signal the reply carries.
    async fn forward_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if self.loading {
            debug!("Dropping message: remote call in flight");
            return;
        }
        self.set_loading(true);

        self.session.push_message(MessageAuthor::User, text);
        self.persist();

        let reply = self.backend.continue_conversation(text).await;
        self.apply_reply(reply).await;
        self.persist();

        self.set_loading(false);
    }

    /// Applies a parsed tutor reply to the session.
    ///
    /// A new-problem signal clears the transcript, records the new
    /// problem, and starts a fresh conversation; its first step is
    /// appended verbatim rather than re-parsed, so a malformed first step
    /// cannot cascade into another transition.
    async fn apply_reply(&mut self, reply: String) {
        match parse_tutor_reply(&reply) {
            TutorSignal::Plain(text) => {
                self.append_tutor(text);
            }
            TutorSignal::Solved(text) => {
                info!("Problem solved");
                self.append_tutor(text);
                self.session.is_solved = true;
            }
            TutorSignal::NewProblem(problem) => {
                info!("Tutor handed out a practice problem");
                self.session.history.clear();
                self.session.problem = Some(problem.clone());
                self.session.is_solved = false;
                self.append_tutor(messages::new_problem_acknowledgment(&problem));
                self.append_tutor(messages::PREPARING_NEXT_STEP);
                self.persist();

                let first_step = self
                    .backend
                    .start_conversation(&self.session.config, &problem)
                    .await;
                self.append_tutor(first_step);
            }
        }
    }

    /// Appends a tutor-authored message.
    fn append_tutor(&mut self, content: impl Into<String>) {
        self.session.push_message(MessageAuthor::Tutor, content);
    }

    /// Mutable session access for in-crate tests.
    #[cfg(test)]
    pub(crate) fn session_mut_for_tests(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Flips the loading flag and publishes the change.
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.publish();
    }

    /// Persists the session, logging (not propagating) failures.
    ///
    /// Persistence is best-effort by design: a failed write must not turn
    /// into a user-visible error, matching the rest of the no-fatal-error
    /// policy. Every persist also publishes a fresh snapshot, so readers
    /// see intermediate status messages while a remote call is in flight.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.session) {
            warn!(error = %e, "Failed to persist session");
        }
        self.publish();
    }

    /// Publishes the current session and loading flag to subscribers.
    fn publish(&self) {
        self.snapshot_tx.send_replace(SessionSnapshot {
            session: self.session.clone(),
            loading: self.loading,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
