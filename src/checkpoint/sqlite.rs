//! SQLite-based checkpoint store.
//!
//! The conversation state is stored as JSON text; the subject and next step
//! are duplicated into columns so sessions can be listed without decoding it.

use super::{Checkpoint, CheckpointStore, SessionId, SessionSummary};
use crate::error::{HealthBotError, Result};
use crate::workflow::{Interrupt, Step, TutorState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS checkpoints (
        session_id TEXT PRIMARY KEY,
        version INTEGER NOT NULL,
        subject TEXT NOT NULL,
        next_step TEXT NOT NULL,
        state_json TEXT NOT NULL,
        pending_json TEXT,
        lesson_count INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_checkpoints_updated_at ON checkpoints(updated_at);
"#;

/// SQLite-based checkpoint store.
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

impl SqliteCheckpointStore {
    /// Open (or create) a checkpoint database file.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite checkpoint store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite checkpoint store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HealthBotError::Checkpoint(format!("Failed to acquire lock: {}", e)))
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HealthBotError::Checkpoint(format!("Invalid timestamp '{}': {}", value, e)))
}

fn parse_step(value: &str) -> Result<Step> {
    value
        .parse()
        .map_err(|e: String| HealthBotError::Checkpoint(e))
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    #[instrument(skip(self, checkpoint), fields(session = %checkpoint.session_id))]
    async fn put(&self, checkpoint: &Checkpoint) -> Result<()> {
        let state_json = serde_json::to_string(&checkpoint.state)?;
        let pending_json = checkpoint
            .pending
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO checkpoints
            (session_id, version, subject, next_step, state_json, pending_json,
             lesson_count, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(session_id) DO UPDATE SET
                version = excluded.version,
                subject = excluded.subject,
                next_step = excluded.next_step,
                state_json = excluded.state_json,
                pending_json = excluded.pending_json,
                lesson_count = excluded.lesson_count,
                updated_at = excluded.updated_at
            "#,
            params![
                checkpoint.session_id.to_string(),
                checkpoint.version as i64,
                checkpoint.state.subject,
                checkpoint.next.as_str(),
                state_json,
                pending_json,
                checkpoint.state.lessons.len() as i64,
                checkpoint.created_at.to_rfc3339(),
                checkpoint.updated_at.to_rfc3339(),
            ],
        )?;

        debug!(
            "Saved checkpoint v{} (next: {})",
            checkpoint.version, checkpoint.next
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &SessionId) -> Result<Option<Checkpoint>> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                r#"
                SELECT version, next_step, state_json, pending_json, created_at, updated_at
                FROM checkpoints
                WHERE session_id = ?1
                "#,
                params![session_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((version, next, state_json, pending_json, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let state: TutorState = serde_json::from_str(&state_json)?;
        let pending: Option<Interrupt> = pending_json
            .map(|json| serde_json::from_str(&json))
            .transpose()?;

        Ok(Some(Checkpoint {
            session_id: *session_id,
            version: version as u64,
            state,
            next: parse_step(&next)?,
            pending,
            created_at: parse_time(&created_at)?,
            updated_at: parse_time(&updated_at)?,
        }))
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &SessionId) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM checkpoints WHERE session_id = ?1",
            params![session_id.to_string()],
        )?;

        info!("Deleted checkpoint for session {}", session_id);
        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, subject, next_step, version, lesson_count, updated_at
            FROM checkpoints
            ORDER BY updated_at DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, subject, next, version, lessons, updated_at) = row?;
            sessions.push(SessionSummary {
                session_id: id.parse()?,
                subject,
                next: parse_step(&next)?,
                version: version as u64,
                lessons: lessons as usize,
                updated_at: parse_time(&updated_at)?,
            });
        }
        Ok(sessions)
    }
}
