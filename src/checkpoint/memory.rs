//! In-memory checkpoint store.
//!
//! Useful for testing and single-process servers that need no persistence.

use super::{Checkpoint, CheckpointStore, SessionId, SessionSummary};
use crate::error::{HealthBotError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory checkpoint store.
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<SessionId, Checkpoint>>,
}

impl MemoryCheckpointStore {
    /// Create a new in-memory checkpoint store.
    pub fn new() -> Self {
        Self {
            checkpoints: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> HealthBotError {
    HealthBotError::Checkpoint(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn put(&self, checkpoint: &Checkpoint) -> Result<()> {
        let mut checkpoints = self.checkpoints.write().map_err(poisoned)?;
        checkpoints.insert(checkpoint.session_id, checkpoint.clone());
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Checkpoint>> {
        let checkpoints = self.checkpoints.read().map_err(poisoned)?;
        Ok(checkpoints.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool> {
        let mut checkpoints = self.checkpoints.write().map_err(poisoned)?;
        Ok(checkpoints.remove(session_id).is_some())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>> {
        let checkpoints = self.checkpoints.read().map_err(poisoned)?;
        let mut sessions: Vec<SessionSummary> =
            checkpoints.values().map(Checkpoint::summary).collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Step, TutorState};

    #[tokio::test]
    async fn test_memory_checkpoint_store() {
        let store = MemoryCheckpointStore::new();
        let session = SessionId::new();

        assert!(store.get(&session).await.unwrap().is_none());

        let mut checkpoint = Checkpoint::new(session, TutorState::with_subject("Sleep hygiene"));
        store.put(&checkpoint).await.unwrap();

        checkpoint.advance(checkpoint.state.clone(), Step::Search);
        store.put(&checkpoint).await.unwrap();

        let loaded = store.get(&session).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.next, Step::Search);

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].subject, "Sleep hygiene");

        assert!(store.delete(&session).await.unwrap());
        assert!(!store.delete(&session).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }
}
