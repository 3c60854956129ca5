//! Pre-flight checks before talking to external services.
//!
//! Validates that credentials and endpoints are configured before starting a
//! session that would otherwise fail at the first model or search call.

use crate::config::{
    AzureSettings, CheckpointProvider, CheckpointSettings, SearchSettings, Settings,
};
use crate::error::{HealthBotError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Tutoring and research need both the chat model and web search.
    Tutor,
    /// Listing or deleting sessions needs a persistent local store.
    Sessions,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or the first configuration error found.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Tutor => {
            check_azure(&settings.azure)?;
            SearchSettings::api_key()?;
        }
        Operation::Sessions => check_store(&settings.checkpoint)?,
    }
    Ok(())
}

fn check_store(checkpoint: &CheckpointSettings) -> Result<()> {
    match checkpoint.provider {
        CheckpointProvider::Memory => Err(HealthBotError::Config(
            "The memory checkpoint store keeps nothing between runs. Set checkpoint.provider = \"sqlite\" to inspect sessions".to_string(),
        )),
        CheckpointProvider::Sqlite if checkpoint.sqlite_path.trim().is_empty() => Err(
            HealthBotError::Config("checkpoint.sqlite_path is empty".to_string()),
        ),
        CheckpointProvider::Sqlite => Ok(()),
    }
}

fn check_azure(azure: &AzureSettings) -> Result<()> {
    azure.resolved_endpoint()?;
    azure.resolved_api_version()?;
    azure.resolved_deployment()?;
    AzureSettings::api_key()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_sessions_needs_no_credentials() {
        assert!(check(Operation::Sessions, &Settings::default()).is_ok());
    }

    #[test]
    fn test_check_sessions_rejects_unusable_store() {
        let mut settings = Settings::default();
        settings.checkpoint.provider = CheckpointProvider::Memory;
        assert!(matches!(
            check(Operation::Sessions, &settings),
            Err(HealthBotError::Config(_))
        ));

        let mut settings = Settings::default();
        settings.checkpoint.sqlite_path = "  ".to_string();
        assert!(check(Operation::Sessions, &settings).is_err());
    }

    #[test]
    fn test_invalid_endpoint_fails() {
        let mut settings = Settings::default();
        settings.azure.endpoint = "not a url".to_string();
        settings.azure.api_version = "2024-08-01-preview".to_string();
        settings.azure.deployment = "gpt-4o".to_string();
        assert!(check(Operation::Tutor, &settings).is_err());
    }
}
