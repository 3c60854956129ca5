//! Session inspection commands.

use crate::checkpoint::{open_store, SessionId};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, SessionAction};
use crate::config::Settings;
use anyhow::Result;
use console::style;

/// Run a session subcommand against the configured checkpoint store.
pub async fn run_sessions(action: &SessionAction, settings: Settings) -> Result<()> {
    preflight::check(Operation::Sessions, &settings)?;
    let store = open_store(&settings)?;

    match action {
        SessionAction::List => {
            let sessions = store.list().await?;
            if sessions.is_empty() {
                Output::info("No sessions yet. Start one with: healthbot tutor");
                return Ok(());
            }

            Output::header(&format!("Sessions ({})", sessions.len()));
            for session in &sessions {
                Output::session_row(
                    &session.session_id.to_string(),
                    &session.subject,
                    session.next.as_str(),
                    session.lessons,
                    &session.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                );
            }
        }

        SessionAction::Show { id } => {
            let session_id: SessionId = id.parse()?;
            let Some(checkpoint) = store.get(&session_id).await? else {
                Output::warning(&format!("Session not found: {}", id));
                return Ok(());
            };

            let state = &checkpoint.state;
            Output::header(&format!("Session {}", session_id.short()));
            Output::kv("Subject", &state.subject);
            Output::kv("Next step", checkpoint.next.as_str());
            Output::kv("Version", &checkpoint.version.to_string());
            Output::kv("Rounds graded", &state.iteration_count.to_string());
            if let Some(pending) = &checkpoint.pending {
                Output::kv("Waiting for", &pending.prompt);
            }

            if !state.lessons.is_empty() {
                println!("\n{}", style("Lessons").bold());
                for (i, lesson) in state.lessons.iter().enumerate() {
                    println!(
                        "  {}. {} [{}]",
                        i + 1,
                        style(&lesson.subject).bold(),
                        lesson.score
                    );
                    println!("     Q: {}", lesson.question);
                    println!("     A: {}", lesson.answer);
                }
            }
        }

        SessionAction::Delete { id } => {
            let session_id: SessionId = id.parse()?;
            if store.delete(&session_id).await? {
                Output::success(&format!("Deleted session {}", session_id));
            } else {
                Output::warning(&format!("Session not found: {}", id));
            }
        }
    }

    Ok(())
}
