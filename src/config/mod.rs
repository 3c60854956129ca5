//! Configuration module for healthbot.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ResearchPrompts, TutorPrompts};
pub use settings::{
    AgentSettings, AzureSettings, CheckpointProvider, CheckpointSettings, GeneralSettings,
    PromptSettings, SearchSettings, Settings, WorkflowSettings,
};
