//! Azure OpenAI client configuration with sensible defaults.

use crate::config::AzureSettings;
use crate::error::Result;
use async_openai::{config::AzureConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an Azure OpenAI client from settings with the default timeout.
///
/// Endpoint, API version and deployment come from settings or the
/// `AZURE_OPENAI_*` environment variables; the key only from the environment.
pub fn create_client(settings: &AzureSettings) -> Result<Client<AzureConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an Azure OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    settings: &AzureSettings,
    timeout: Duration,
) -> Result<Client<AzureConfig>> {
    let config = AzureConfig::new()
        .with_api_base(settings.resolved_endpoint()?)
        .with_api_version(settings.resolved_api_version()?)
        .with_deployment_id(settings.resolved_deployment()?)
        .with_api_key(AzureSettings::api_key()?);

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
