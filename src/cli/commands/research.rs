//! Research command implementation.

use crate::agent::{ResearchAgent, ToolContext};
use crate::cli::output::content_preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::AzureChatModel;
use crate::search::TavilySearch;
use anyhow::Result;
use std::sync::Arc;

/// Run the research agent once for `query`.
pub async fn run_research(query: &str, raw: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Tutor, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'healthbot doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let model = Arc::new(AzureChatModel::from_settings(&settings.azure)?);
    let search = Arc::new(TavilySearch::from_settings(&settings.search)?);

    let agent = ResearchAgent::new(model, ToolContext::new(search, settings.search.max_results))
        .with_system_prompt(&prompts.research.system)
        .with_max_iterations(settings.agent.max_iterations);

    let spinner = Output::spinner("Researching...");

    match agent.run(query).await {
        Ok(outcome) => {
            spinner.finish_and_clear();

            if raw {
                println!("{}", outcome.transcript());
                return Ok(());
            }

            println!("\n{}\n", outcome.content);

            if !outcome.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", outcome.tool_calls.len()));
                for call in &outcome.tool_calls {
                    Output::info(&format!("  {}", content_preview(&call.to_string(), 80)));
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} iteration(s)",
                outcome.iterations
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Research failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
