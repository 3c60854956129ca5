//! Checkpoint persistence for tutoring sessions.
//!
//! Each session has exactly one checkpoint, overwritten after every executed
//! workflow step. Resuming a paused session starts from the stored checkpoint.

mod memory;
mod sqlite;

pub use memory::MemoryCheckpointStore;
pub use sqlite::SqliteCheckpointStore;

use crate::config::{CheckpointProvider, Settings};
use crate::error::{HealthBotError, Result};
use crate::workflow::{Interrupt, Step, TutorState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Opaque identifier scoping one user's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh, never-used session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight characters, for display.
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = HealthBotError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| HealthBotError::InvalidInput(format!("Invalid session id '{}': {}", s, e)))
    }
}

/// Persisted snapshot of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub session_id: SessionId,
    /// Incremented once per executed step.
    pub version: u64,
    pub state: TutorState,
    /// Step that runs when the session continues; `Done` once finished.
    pub next: Step,
    /// Set while the session waits for an external value.
    pub pending: Option<Interrupt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    /// A fresh checkpoint positioned at the first step.
    pub fn new(session_id: SessionId, state: TutorState) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            version: 0,
            state,
            next: Step::first(),
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next == Step::Done
    }

    /// Record that a step completed and the session moves to `next`.
    pub fn advance(&mut self, state: TutorState, next: Step) {
        self.state = state;
        self.next = next;
        self.pending = None;
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Record that the session paused at `interrupt.step`.
    pub fn pause(&mut self, interrupt: Interrupt) {
        self.next = interrupt.step;
        self.pending = Some(interrupt);
        self.version += 1;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            subject: self.state.subject.clone(),
            next: self.next,
            version: self.version,
            lessons: self.state.lessons.len(),
            updated_at: self.updated_at,
        }
    }
}

/// One row of the session listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub subject: String,
    pub next: Step,
    pub version: u64,
    pub lessons: usize,
    pub updated_at: DateTime<Utc>,
}

/// Trait for checkpoint store implementations.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Insert or overwrite the checkpoint of a session.
    async fn put(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// Load the checkpoint of a session.
    async fn get(&self, session_id: &SessionId) -> Result<Option<Checkpoint>>;

    /// Delete a session's checkpoint. Returns whether one existed.
    async fn delete(&self, session_id: &SessionId) -> Result<bool>;

    /// List all sessions, most recently updated first.
    async fn list(&self) -> Result<Vec<SessionSummary>>;
}

/// Open the store selected in settings.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn CheckpointStore>> {
    match settings.checkpoint.provider {
        CheckpointProvider::Sqlite => {
            Ok(Arc::new(SqliteCheckpointStore::new(&settings.sqlite_path())?))
        }
        CheckpointProvider::Memory => Ok(Arc::new(MemoryCheckpointStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_roundtrip_and_uniqueness() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_ne!(id, SessionId::new());
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_invalid_session_id() {
        let err = "not-a-uuid".parse::<SessionId>().unwrap_err();
        assert!(matches!(err, HealthBotError::InvalidInput(_)));
    }

    #[test]
    fn test_advance_and_pause_bump_version() {
        let mut checkpoint = Checkpoint::new(SessionId::new(), TutorState::default());
        assert_eq!(checkpoint.next, Step::CollectSubject);

        checkpoint.advance(TutorState::default(), Step::Search);
        assert_eq!(checkpoint.version, 1);
        assert_eq!(checkpoint.next, Step::Search);

        let interrupt = Interrupt::confirm("Continue? (yes/no)");
        checkpoint.pause(interrupt);
        assert_eq!(checkpoint.version, 2);
        assert_eq!(checkpoint.next, Step::AskContinue);
        assert!(checkpoint.pending.is_some());
    }
}
