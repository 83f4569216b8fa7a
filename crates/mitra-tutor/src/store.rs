//! Durable session persistence.
//!
//! The session is written to a single JSON file after every state
//! mutation and read back once at startup. Corrupt or unrecognized
//! blobs never fail startup: they are discarded and replaced with a
//! default session. There is no cross-process transaction; the last
//! writer wins.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TutorError};
use crate::session::Session;

/// File-backed store for the tutoring session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses and validates a persisted session blob.
    ///
    /// This is a pure function from raw bytes to a session; an
    /// unrecognized exam level fails validation exactly like malformed
    /// JSON does.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::StateFileCorrupted`] if the blob cannot be
    /// parsed into a valid session.
    pub fn parse_session(&self, bytes: &[u8]) -> Result<Session> {
        serde_json::from_slice(bytes)
            .map_err(|e| TutorError::state_corrupted(&self.path, e.to_string()))
    }

    /// Loads the persisted session, falling back to the default.
    ///
    /// A missing file yields the default session silently. A corrupt file
    /// is logged, deleted, and replaced with the default; startup never
    /// fails because of bad stored state.
    #[must_use]
    pub fn load(&self) -> Session {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted session, starting fresh");
                return Session::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read persisted session");
                return Session::new();
            }
        };

        match self.parse_session(&bytes) {
            Ok(session) => {
                debug!(
                    path = %self.path.display(),
                    messages = session.history.len(),
                    "Restored persisted session"
                );
                session
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt persisted session");
                if let Err(remove_err) = std::fs::remove_file(&self.path) {
                    warn!(error = %remove_err, "Failed to remove corrupt session file");
                }
                Session::new()
            }
        }
    }

    /// Persists the session to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
