//! Configuration settings for healthbot.

use crate::error::{HealthBotError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub azure: AzureSettings,
    pub search: SearchSettings,
    pub agent: AgentSettings,
    pub workflow: WorkflowSettings,
    pub checkpoint: CheckpointSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.healthbot".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Azure OpenAI deployment settings.
///
/// Empty values fall back to the `AZURE_OPENAI_*` environment variables.
/// The API key is only ever read from `AZURE_OPENAI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// REST API version.
    pub api_version: String,
    /// Chat model deployment name.
    pub deployment: String,
    /// Sampling temperature for every call.
    pub temperature: f32,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_version: String::new(),
            deployment: String::new(),
            temperature: 0.0,
        }
    }
}

impl AzureSettings {
    pub const ENDPOINT_VAR: &'static str = "AZURE_OPENAI_ENDPOINT";
    pub const API_VERSION_VAR: &'static str = "AZURE_OPENAI_API_VERSION";
    pub const DEPLOYMENT_VAR: &'static str = "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME";
    pub const API_KEY_VAR: &'static str = "AZURE_OPENAI_API_KEY";

    /// Resolve the endpoint, validating that it is an absolute URL.
    pub fn resolved_endpoint(&self) -> Result<String> {
        let endpoint = resolve(&self.endpoint, Self::ENDPOINT_VAR)?;
        url::Url::parse(&endpoint).map_err(|e| {
            HealthBotError::Config(format!("Invalid Azure endpoint '{}': {}", endpoint, e))
        })?;
        Ok(endpoint.trim_end_matches('/').to_string())
    }

    /// Resolve the API version.
    pub fn resolved_api_version(&self) -> Result<String> {
        resolve(&self.api_version, Self::API_VERSION_VAR)
    }

    /// Resolve the deployment name.
    pub fn resolved_deployment(&self) -> Result<String> {
        resolve(&self.deployment, Self::DEPLOYMENT_VAR)
    }

    /// Read the API key from the environment.
    pub fn api_key() -> Result<String> {
        resolve("", Self::API_KEY_VAR)
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of the Tavily API.
    pub base_url: String,
    /// Number of results returned per query.
    pub max_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            max_results: 2,
        }
    }
}

impl SearchSettings {
    pub const API_KEY_VAR: &'static str = "TAVILY_API_KEY";

    /// Read the Tavily API key from the environment.
    pub fn api_key() -> Result<String> {
        resolve("", Self::API_KEY_VAR)
    }
}

/// Research agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum model calls per research run.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_iterations: 50 }
    }
}

/// Tutoring workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Maximum steps a single start/resume call may execute.
    pub step_limit: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self { step_limit: 50 }
    }
}

/// Checkpoint store backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointProvider {
    /// SQLite file (default).
    #[default]
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

impl std::str::FromStr for CheckpointProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(CheckpointProvider::Sqlite),
            "memory" => Ok(CheckpointProvider::Memory),
            _ => Err(format!("Unknown checkpoint provider: {}", s)),
        }
    }
}

impl std::fmt::Display for CheckpointProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointProvider::Sqlite => write!(f, "sqlite"),
            CheckpointProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Checkpoint store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSettings {
    pub provider: CheckpointProvider,
    /// Path to the SQLite database (for the sqlite provider).
    pub sqlite_path: String,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            provider: CheckpointProvider::Sqlite,
            sqlite_path: "~/.healthbot/checkpoints.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HealthBotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("healthbot")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite checkpoint database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.checkpoint.sqlite_path)
    }
}

/// Use the configured value if present, otherwise the environment variable.
fn resolve(configured: &str, var: &str) -> Result<String> {
    if !configured.trim().is_empty() {
        return Ok(configured.trim().to_string());
    }
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => Err(HealthBotError::Config(format!("{} is empty", var))),
        Err(_) => Err(HealthBotError::Config(format!("{} not set", var))),
    }
}
