//! Doctor command - verify configuration and credentials.

use crate::cli::Output;
use crate::config::{AzureSettings, CheckpointProvider, SearchSettings, Settings};
use crate::error::Result;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("HealthBot Doctor");
    println!();
    println!("Checking configuration and credentials...\n");

    let mut checks = Vec::new();

    print_group("Azure OpenAI", check_azure(&settings.azure), &mut checks);
    print_group(
        "Web Search",
        vec![check_secret(
            SearchSettings::API_KEY_VAR,
            SearchSettings::api_key(),
        )],
        &mut checks,
    );
    print_group("Storage", check_storage(settings), &mut checks);
    print_group("Configuration", vec![check_config_file()], &mut checks);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using HealthBot.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! HealthBot is ready to use.");
    }

    Ok(())
}

fn print_group(title: &str, results: Vec<CheckResult>, all: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for check in &results {
        check.print();
    }
    println!();
    all.extend(results);
}

/// Check the deployment coordinates and the API key.
fn check_azure(azure: &AzureSettings) -> Vec<CheckResult> {
    vec![
        check_value(
            "Endpoint",
            azure.resolved_endpoint(),
            AzureSettings::ENDPOINT_VAR,
        ),
        check_value(
            "API version",
            azure.resolved_api_version(),
            AzureSettings::API_VERSION_VAR,
        ),
        check_value(
            "Deployment",
            azure.resolved_deployment(),
            AzureSettings::DEPLOYMENT_VAR,
        ),
        check_secret(AzureSettings::API_KEY_VAR, AzureSettings::api_key()),
    ]
}

fn check_value(name: &str, value: Result<String>, var: &str) -> CheckResult {
    match value {
        Ok(v) => CheckResult::ok(name, &v),
        Err(e) => CheckResult::error(
            name,
            &e.to_string(),
            &format!("Set it in the config file or with: export {}=...", var),
        ),
    }
}

fn check_secret(var: &str, value: Result<String>) -> CheckResult {
    match value {
        Ok(key) => CheckResult::ok(var, &format!("configured ({})", mask(&key))),
        Err(_) => CheckResult::error(
            var,
            "not set",
            &format!("Set with: export {}='...'", var),
        ),
    }
}

/// Show only the edges of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check data directory and checkpoint database.
fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    match settings.checkpoint.provider {
        CheckpointProvider::Memory => results.push(CheckResult::warning(
            "Checkpoints",
            "memory (sessions are lost on exit)",
            "Set checkpoint.provider = \"sqlite\" to keep sessions",
        )),
        CheckpointProvider::Sqlite => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Checkpoints",
                    &format!("{} ({})", db_path.display(), size),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Checkpoints",
                    &format!("{} (not created yet)", db_path.display()),
                    "Database will be created with the first session",
                ));
            }
        }
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: healthbot config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
