//! Error types for healthbot.

use thiserror::Error;

/// Library-level error type for healthbot operations.
#[derive(Error, Debug)]
pub enum HealthBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Checkpoint store error: {0}")]
    Checkpoint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for healthbot operations.
pub type Result<T> = std::result::Result<T, HealthBotError>;
