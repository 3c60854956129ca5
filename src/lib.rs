//! HealthBot - Health Education Tutor
//!
//! An interactive assistant that researches a health topic on the web,
//! explains it in plain language, quizzes the learner and grades the answer.
//!
//! # Overview
//!
//! HealthBot provides:
//! - A tool-using research agent backed by Azure OpenAI and Tavily search
//! - A tutoring workflow that pauses for the learner's input and resumes later
//! - Per-session checkpoints in SQLite or memory
//! - A terminal tutor and a JSON HTTP API
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Chat model abstraction and the Azure implementation
//! - `search` - Web search abstraction and the Tavily client
//! - `agent` - Research agent loop with tool calling
//! - `workflow` - Tutoring steps, interrupts and the runner
//! - `checkpoint` - Session checkpoint stores
//!
//! # Example
//!
//! ```rust,no_run
//! use healthbot::checkpoint::SessionId;
//! use healthbot::config::Settings;
//! use healthbot::workflow::{RunStatus, TutorWorkflow};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let workflow = TutorWorkflow::from_settings(&settings)?;
//!
//!     let session = SessionId::new();
//!     let outcome = workflow.start(session, "Diabetes Diet Management").await?;
//!     if let RunStatus::Interrupted(interrupt) = outcome.status {
//!         println!("{}", interrupt.question.unwrap_or_default());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod search;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{HealthBotError, Result};
