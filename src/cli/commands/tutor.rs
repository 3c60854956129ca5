//! Interactive terminal tutor.

use crate::checkpoint::SessionId;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{HealthBotError, Result};
use crate::workflow::{
    Interrupt, InterruptKind, RunOutcome, RunStatus, Step, TutorWorkflow, WorkflowEvent,
};
use console::style;
use std::future::Future;
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Typed at any prompt to drop the session and start over.
const RESET_COMMAND: &str = "reset";

/// Run the interactive tutor.
pub async fn run_tutor(
    subject: Option<String>,
    session: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Tutor, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'healthbot doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let (tx, mut events) = unbounded_channel();
    let workflow = TutorWorkflow::from_settings(&settings)?.with_observer(tx);

    println!("\n{}", style("HealthBot Tutor").bold().cyan());
    println!(
        "{}\n",
        style("Answer 'exit' to a question to finish, or type 'reset' to start over.").dim()
    );

    let mut session_id = match session {
        Some(id) => id.parse::<SessionId>()?,
        None => SessionId::new(),
    };

    let mut pending = match workflow.snapshot(session_id).await? {
        Some(checkpoint) if checkpoint.pending.is_some() => {
            Output::info(&format!(
                "Continuing session {} on '{}'",
                session_id.short(),
                checkpoint.state.subject
            ));
            if let Some(interrupt) = &checkpoint.pending {
                show_interrupt(interrupt);
            }
            checkpoint.pending
        }
        _ => {
            let subject = match subject {
                Some(s) => s,
                None => match read_input("What health topic would you like to learn about?")? {
                    Some(s) => s,
                    None => return Ok(()),
                },
            };
            let outcome = drive(workflow.start(session_id, &subject), &mut events).await?;
            Output::kv("Session", &session_id.to_string());
            pending_of(&outcome)
        }
    };

    while let Some(interrupt) = pending.clone() {
        let Some(input) = read_input(&input_label(&interrupt))? else {
            break;
        };

        if input.eq_ignore_ascii_case(RESET_COMMAND) {
            workflow.reset(session_id).await?;
            session_id = SessionId::new();
            Output::info(&format!("Started a fresh session {}", session_id.short()));

            let Some(subject) = read_input("What health topic would you like to learn about?")?
            else {
                break;
            };
            let outcome = drive(workflow.start(session_id, &subject), &mut events).await?;
            pending = pending_of(&outcome);
            continue;
        }

        match drive(workflow.resume(session_id, &input), &mut events).await {
            Ok(outcome) => pending = pending_of(&outcome),
            Err(HealthBotError::InvalidInput(msg)) => Output::warning(&msg),
            Err(e) => return Err(e.into()),
        }
    }

    Output::info("Goodbye!");
    Ok(())
}

/// Await a workflow run while rendering its events as they arrive.
async fn drive<F>(run: F, events: &mut UnboundedReceiver<WorkflowEvent>) -> Result<RunOutcome>
where
    F: Future<Output = Result<RunOutcome>>,
{
    let spinner = Output::spinner("Thinking...");
    tokio::pin!(run);

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            Some(event) = events.recv() => {
                spinner.suspend(|| render(&event));
                if let WorkflowEvent::StepCompleted { step, .. } = &event {
                    if let Some(next) = step.successor() {
                        spinner.set_message(working_message(next));
                    }
                }
            }
        }
    };
    spinner.finish_and_clear();

    // Events sent just before the run returned.
    while let Ok(event) = events.try_recv() {
        render(&event);
    }
    result
}

fn pending_of(outcome: &RunOutcome) -> Option<Interrupt> {
    match &outcome.status {
        RunStatus::Interrupted(interrupt) => Some(interrupt.clone()),
        RunStatus::Finished => None,
    }
}

fn working_message(step: Step) -> String {
    match step {
        Step::Search => "Searching the web...".to_string(),
        Step::Summarize => "Writing a summary...".to_string(),
        Step::Quiz => "Preparing a question...".to_string(),
        Step::Grade => "Grading your answer...".to_string(),
        other => format!("Running {}...", other),
    }
}

fn render(event: &WorkflowEvent) {
    match event {
        WorkflowEvent::StepCompleted {
            step: Step::Summarize,
            output: Some(summary),
        } => Output::section("Summary", summary),
        WorkflowEvent::StepCompleted {
            step: Step::Grade,
            output: Some(grade),
        } => Output::section("Result", grade),
        WorkflowEvent::Interrupted(interrupt) => show_interrupt(interrupt),
        other => {
            if let Some(text) = other.message() {
                Output::info(&text);
            }
        }
    }
}

fn show_interrupt(interrupt: &Interrupt) {
    if let Some(question) = &interrupt.question {
        Output::section("Question", question);
    }
    println!("\n{}", style(&interrupt.prompt).dim());
}

fn input_label(interrupt: &Interrupt) -> String {
    match interrupt.kind {
        InterruptKind::Subject => "New topic:".to_string(),
        InterruptKind::Answer => "Your answer:".to_string(),
        InterruptKind::Confirm => "Continue? (yes/no):".to_string(),
    }
}

/// Read one non-empty line; `None` on end of input.
fn read_input(label: &str) -> Result<Option<String>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style(label).green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }

        let input = input.trim();
        if !input.is_empty() {
            return Ok(Some(input.to_string()));
        }
    }
}
