//! Tutoring workflow runner.
//!
//! Runs steps one at a time, persisting a checkpoint after each. A step that
//! needs human input pauses the session; `resume` re-enters that step with
//! the supplied value.

use super::state::{GradeResult, LessonRecord, TutorState};
use super::step::{Interrupt, InterruptKind, Step};
use crate::agent::{ResearchAgent, ToolContext};
use crate::checkpoint::{open_store, Checkpoint, CheckpointStore, SessionId, SessionSummary};
use crate::config::{Prompts, Settings};
use crate::error::{HealthBotError, Result};
use crate::llm::{self, AzureChatModel, ChatModel, OutputSchema};
use crate::search::{SearchTool, TavilySearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

/// Progress notification emitted while a session runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A step finished; `output` carries what the user should see.
    StepCompleted { step: Step, output: Option<String> },
    /// The session paused for input.
    Interrupted(Interrupt),
    /// The session reached the end.
    Finished,
}

impl WorkflowEvent {
    /// Text a conversational surface shows for this event, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            WorkflowEvent::StepCompleted {
                step: Step::CollectSubject,
                output: Some(subject),
            } => Some(format!("Studying: {}", subject)),
            WorkflowEvent::StepCompleted {
                step: Step::Summarize | Step::Grade,
                output: Some(text),
            } => Some(text.clone()),
            WorkflowEvent::StepCompleted { .. } => None,
            WorkflowEvent::Interrupted(interrupt) => Some(match &interrupt.question {
                Some(question) => format!("{}\n\n{}", question, interrupt.prompt),
                None => interrupt.prompt.clone(),
            }),
            WorkflowEvent::Finished => Some("Session finished.".to_string()),
        }
    }
}

/// Where a run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Interrupted(Interrupt),
    Finished,
}

/// Result of `start` or `resume`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub checkpoint: Checkpoint,
    pub events: Vec<WorkflowEvent>,
}

enum StepResult {
    Advance {
        state: TutorState,
        next: Step,
        output: Option<String>,
    },
    Pause(Interrupt),
}

/// The tutoring workflow bound to a model, a search backend and a store.
pub struct TutorWorkflow {
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchTool>,
    store: Arc<dyn CheckpointStore>,
    prompts: Prompts,
    max_results: u32,
    agent_iterations: usize,
    step_limit: usize,
    observer: Option<UnboundedSender<WorkflowEvent>>,
}

impl TutorWorkflow {
    /// Create a workflow from explicit components with default limits.
    pub fn new(
        model: Arc<dyn ChatModel>,
        search: Arc<dyn SearchTool>,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            model,
            search,
            store,
            prompts: Prompts::default(),
            max_results: 2,
            agent_iterations: 50,
            step_limit: 50,
            observer: None,
        }
    }

    /// Build the production workflow: Azure model, Tavily search, configured store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let model = Arc::new(AzureChatModel::from_settings(&settings.azure)?);
        let search = Arc::new(TavilySearch::from_settings(&settings.search)?);
        let store = open_store(settings)?;

        Ok(Self::new(model, search, store)
            .with_prompts(prompts)
            .with_max_results(settings.search.max_results)
            .with_agent_iterations(settings.agent.max_iterations)
            .with_step_limit(settings.workflow.step_limit))
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_agent_iterations(mut self, max: usize) -> Self {
        self.agent_iterations = max;
        self
    }

    /// Maximum steps one `start`/`resume` call may execute.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Send every event to `observer` as it happens.
    pub fn with_observer(mut self, observer: UnboundedSender<WorkflowEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Begin a run with an initial subject.
    ///
    /// A finished session may be started again; its lesson log is kept.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn start(&self, session_id: SessionId, subject: &str) -> Result<RunOutcome> {
        let subject = require_text(subject, "subject")?;

        let checkpoint = match self.store.get(&session_id).await? {
            Some(existing) if !existing.is_finished() => {
                return Err(HealthBotError::InvalidInput(match existing.pending {
                    Some(_) => format!(
                        "Session {} is already in progress (waiting at {}); resume it or reset the session to start over",
                        session_id, existing.next
                    ),
                    None => stalled(session_id, existing.next),
                }));
            }
            Some(mut finished) => {
                let mut state = finished.state.clone();
                state.subject = subject;
                state.clear_round();
                state.is_finished = false;
                state.continue_choice.clear();
                finished.advance(state, Step::first());
                finished
            }
            None => Checkpoint::new(session_id, TutorState::with_subject(&subject)),
        };

        info!("Starting session on '{}'", checkpoint.state.subject);
        self.store.put(&checkpoint).await?;
        self.execute(checkpoint, None).await
    }

    /// Supply the value a paused session is waiting for and continue.
    #[instrument(skip(self, value), fields(session = %session_id))]
    pub async fn resume(&self, session_id: SessionId, value: &str) -> Result<RunOutcome> {
        let checkpoint = self
            .store
            .get(&session_id)
            .await?
            .ok_or_else(|| HealthBotError::SessionNotFound(session_id.to_string()))?;

        let interrupt = checkpoint.pending.clone().ok_or_else(|| {
            HealthBotError::InvalidInput(if checkpoint.is_finished() {
                format!(
                    "Session {} has finished; start it again with a new subject",
                    session_id
                )
            } else {
                stalled(session_id, checkpoint.next)
            })
        })?;

        let value = validate_resume(&interrupt, value)?;
        info!("Resuming at {}", interrupt.step);
        self.execute(checkpoint, Some(value)).await
    }

    /// Current checkpoint of a session.
    pub async fn snapshot(&self, session_id: SessionId) -> Result<Option<Checkpoint>> {
        self.store.get(&session_id).await
    }

    /// Drop a session's persisted state.
    pub async fn reset(&self, session_id: SessionId) -> Result<bool> {
        self.store.delete(&session_id).await
    }

    /// All stored sessions, most recently updated first.
    pub async fn sessions(&self) -> Result<Vec<SessionSummary>> {
        self.store.list().await
    }

    async fn execute(
        &self,
        mut checkpoint: Checkpoint,
        mut resume: Option<String>,
    ) -> Result<RunOutcome> {
        let mut events = Vec::new();
        let mut executed = 0;

        loop {
            if checkpoint.is_finished() {
                self.emit(&mut events, WorkflowEvent::Finished);
                info!("Session finished");
                return Ok(RunOutcome {
                    status: RunStatus::Finished,
                    checkpoint,
                    events,
                });
            }

            if executed >= self.step_limit {
                warn!("Step limit reached at {}", checkpoint.next);
                return Err(HealthBotError::Workflow(format!(
                    "Step limit ({}) reached without reaching an interrupt or the end",
                    self.step_limit
                )));
            }
            executed += 1;

            let step = checkpoint.next;
            info!("--- {} ---", step);

            match self.run_step(step, &checkpoint.state, resume.take()).await? {
                StepResult::Advance {
                    state,
                    next,
                    output,
                } => {
                    checkpoint.advance(state, next);
                    self.store.put(&checkpoint).await?;
                    self.emit(&mut events, WorkflowEvent::StepCompleted { step, output });
                }
                StepResult::Pause(interrupt) => {
                    checkpoint.pause(interrupt.clone());
                    self.store.put(&checkpoint).await?;
                    self.emit(&mut events, WorkflowEvent::Interrupted(interrupt.clone()));
                    return Ok(RunOutcome {
                        status: RunStatus::Interrupted(interrupt),
                        checkpoint,
                        events,
                    });
                }
            }
        }
    }

    fn emit(&self, events: &mut Vec<WorkflowEvent>, event: WorkflowEvent) {
        if let Some(observer) = &self.observer {
            // A dropped receiver only means nobody is watching.
            let _ = observer.send(event.clone());
        }
        events.push(event);
    }

    async fn run_step(
        &self,
        step: Step,
        current: &TutorState,
        resume: Option<String>,
    ) -> Result<StepResult> {
        let mut state = current.clone();

        let output = match step {
            Step::CollectSubject => {
                if !state.is_finished && state.grade.is_some() {
                    match resume {
                        Some(subject) => state.subject = subject,
                        None => {
                            return Ok(StepResult::Pause(Interrupt::subject(
                                &self.prompts.tutor.new_subject,
                            )))
                        }
                    }
                }
                state.clear_round();
                Some(state.subject.clone())
            }

            Step::Search => {
                let query = self.prompts.render_with_custom(
                    &self.prompts.tutor.search_query,
                    &[("subject", state.subject.as_str())],
                );
                let agent = ResearchAgent::new(
                    self.model.clone(),
                    ToolContext::new(self.search.clone(), self.max_results),
                )
                .with_system_prompt(&self.prompts.research.system)
                .with_max_iterations(self.agent_iterations);

                let outcome = agent.run(&query).await?;
                state.search_results = match outcome.last_tool_result() {
                    Some(result) => result.to_string(),
                    None => outcome.content.clone(),
                };
                None
            }

            Step::Summarize => {
                let prompt = self.prompts.render_with_custom(
                    &self.prompts.tutor.summarize,
                    &[("context", state.search_results.as_str())],
                );
                let summary = llm::ask(self.model.as_ref(), &prompt).await?;
                state.summary = Some(summary.clone());
                Some(summary)
            }

            Step::Quiz => {
                let summary = state.summary.clone().unwrap_or_default();
                let prompt = self
                    .prompts
                    .render_with_custom(&self.prompts.tutor.quiz, &[("summary", summary.as_str())]);
                state.quiz_question = llm::ask(self.model.as_ref(), &prompt).await?;
                Some(state.quiz_question.clone())
            }

            Step::AwaitAnswer => match resume {
                Some(answer) => {
                    state.is_finished = answer.eq_ignore_ascii_case("exit");
                    state.user_answer = answer;
                    None
                }
                None => {
                    return Ok(StepResult::Pause(Interrupt::answer(
                        &self.prompts.tutor.answer_instruction,
                        &state.quiz_question,
                    )))
                }
            },

            Step::Grade => {
                let summary = state.summary.clone().unwrap_or_default();
                let prompt = self.prompts.render_with_custom(
                    &self.prompts.tutor.grade,
                    &[
                        ("summary", summary.as_str()),
                        ("question", state.quiz_question.as_str()),
                        ("answer", state.user_answer.as_str()),
                    ],
                );
                let result: GradeResult = llm::ask_structured(
                    self.model.as_ref(),
                    &prompt,
                    &OutputSchema::of::<GradeResult>("grade_result"),
                )
                .await?;

                let grade = result.display();
                info!("Scored {}", result.letter());
                state.lessons.push(LessonRecord {
                    subject: state.subject.clone(),
                    question: state.quiz_question.clone(),
                    answer: state.user_answer.clone(),
                    score: result.letter(),
                    justification: result.justification.trim().to_string(),
                });
                state.iteration_count += 1;
                state.grade = Some(grade.clone());
                Some(grade)
            }

            Step::AskContinue => {
                if state.is_finished {
                    return Ok(StepResult::Advance {
                        state,
                        next: Step::Done,
                        output: None,
                    });
                }
                let Some(choice) = resume else {
                    return Ok(StepResult::Pause(Interrupt::confirm(
                        &self.prompts.tutor.ask_continue,
                    )));
                };
                let next = if choice == "yes" {
                    Step::CollectSubject
                } else {
                    Step::Done
                };
                state.continue_choice = choice;
                return Ok(StepResult::Advance {
                    state,
                    next,
                    output: None,
                });
            }

            Step::Done => {
                return Err(HealthBotError::Workflow(
                    "Session has already finished".to_string(),
                ))
            }
        };

        let next = step.successor().ok_or_else(|| {
            HealthBotError::Workflow(format!("Step {} has no successor", step))
        })?;
        Ok(StepResult::Advance {
            state,
            next,
            output,
        })
    }
}

fn require_text(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HealthBotError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(value.to_string())
}

/// Check a resume value against what the interrupt expects.
fn validate_resume(interrupt: &Interrupt, value: &str) -> Result<String> {
    match interrupt.kind {
        InterruptKind::Subject => require_text(value, "subject"),
        InterruptKind::Answer => require_text(value, "answer"),
        InterruptKind::Confirm => {
            let choice = value.trim().to_lowercase();
            match choice.as_str() {
                "yes" | "no" => Ok(choice),
                _ => Err(HealthBotError::InvalidInput(format!(
                    "Expected 'yes' or 'no', got '{}'",
                    value.trim()
                ))),
            }
        }
    }
}

/// Message for a session whose last run failed between interrupts.
fn stalled(session_id: SessionId, next: Step) -> String {
    format!(
        "Session {} is not waiting for input: its last run stopped with an error before {}. Reset the session to start over",
        session_id, next
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use crate::testing::{StaticSearch, TutorModel};

    struct Harness {
        workflow: TutorWorkflow,
        model: Arc<TutorModel>,
        search: Arc<StaticSearch>,
        store: Arc<MemoryCheckpointStore>,
    }

    impl Harness {
        /// Another workflow over the same model, search and store.
        fn sibling(&self) -> TutorWorkflow {
            TutorWorkflow::new(self.model.clone(), self.search.clone(), self.store.clone())
        }
    }

    fn harness() -> Harness {
        let model = Arc::new(TutorModel::default());
        let search = Arc::new(StaticSearch::with_snippet("Fiber slows glucose absorption."));
        let store = Arc::new(MemoryCheckpointStore::new());
        let workflow = TutorWorkflow::new(model.clone(), search.clone(), store.clone());
        Harness {
            workflow,
            model,
            search,
            store,
        }
    }

    fn completed_steps(events: &[WorkflowEvent]) -> Vec<Step> {
        events
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::StepCompleted { step, .. } => Some(*step),
                _ => None,
            })
            .collect()
    }

    fn expect_interrupt(outcome: &RunOutcome, kind: InterruptKind) -> &Interrupt {
        match &outcome.status {
            RunStatus::Interrupted(interrupt) if interrupt.kind == kind => interrupt,
            other => panic!("Expected {:?} interrupt, got {:?}", kind, other),
        }
    }

    #[tokio::test]
    async fn test_start_runs_until_answer_interrupt() {
        let h = harness();
        let session = SessionId::new();

        let outcome = h.workflow.start(session, "Diabetes Diet Management").await.unwrap();

        let interrupt = expect_interrupt(&outcome, InterruptKind::Answer);
        assert_eq!(interrupt.question.as_deref(), Some("What is the key takeaway?"));
        assert_eq!(
            completed_steps(&outcome.events),
            vec![Step::CollectSubject, Step::Search, Step::Summarize, Step::Quiz]
        );

        let state = &outcome.checkpoint.state;
        assert!(state.search_results.contains("Fiber slows glucose absorption."));
        assert_eq!(state.summary.as_deref(), Some("A friendly summary."));
        assert!(state.grade.is_none());
        assert_eq!(outcome.checkpoint.next, Step::AwaitAnswer);

        let query = &h.search.queries()[0];
        assert!(query.contains("Diabetes Diet Management"));
        assert!(h.model.prompts()[0].contains("for patient education"));

        let stored = h.workflow.snapshot(session).await.unwrap().unwrap();
        assert_eq!(stored.version, outcome.checkpoint.version);
        assert!(stored.pending.is_some());
    }

    #[tokio::test]
    async fn test_grade_requires_quiz_and_answer() {
        let h = harness();
        let session = SessionId::new();

        let first = h.workflow.start(session, "Asthma").await.unwrap();
        assert!(!completed_steps(&first.events).contains(&Step::Grade));

        let second = h.workflow.resume(session, "Avoid triggers").await.unwrap();
        expect_interrupt(&second, InterruptKind::Confirm);
        assert_eq!(
            completed_steps(&second.events),
            vec![Step::AwaitAnswer, Step::Grade]
        );

        let state = &second.checkpoint.state;
        assert_eq!(state.user_answer, "Avoid triggers");
        assert_eq!(
            state.grade.as_deref(),
            Some("Grade: B\nJustification: Mostly correct.")
        );
        assert_eq!(state.iteration_count, 1);
        assert_eq!(state.lessons.len(), 1);
        assert_eq!(state.lessons[0].answer, "Avoid triggers");

        let grade_prompt = h.model.prompts().last().cloned().unwrap();
        assert!(grade_prompt.contains("User answer: Avoid triggers"));
        assert!(grade_prompt.contains("Question: What is the key takeaway?"));
    }

    #[tokio::test]
    async fn test_exit_finishes_after_grading() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Sleep").await.unwrap();

        let outcome = h.workflow.resume(session, "EXIT").await.unwrap();

        assert_eq!(outcome.status, RunStatus::Finished);
        assert!(outcome.checkpoint.state.is_finished);
        assert!(outcome.checkpoint.is_finished());
        assert_eq!(
            completed_steps(&outcome.events),
            vec![Step::AwaitAnswer, Step::Grade, Step::AskContinue]
        );
        assert_eq!(outcome.events.last(), Some(&WorkflowEvent::Finished));

        let err = h.workflow.resume(session, "anything").await.unwrap_err();
        assert!(matches!(err, HealthBotError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_no_ends_session() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        h.workflow.resume(session, "Rest and fluids").await.unwrap();

        let outcome = h.workflow.resume(session, " No ").await.unwrap();
        assert_eq!(outcome.status, RunStatus::Finished);
        assert_eq!(outcome.checkpoint.state.continue_choice, "no");
        assert!(!outcome.checkpoint.state.is_finished);
    }

    #[tokio::test]
    async fn test_yes_restarts_with_new_subject_and_clears_round() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        h.workflow.resume(session, "Rest and fluids").await.unwrap();

        let outcome = h.workflow.resume(session, "yes").await.unwrap();
        let interrupt = expect_interrupt(&outcome, InterruptKind::Subject);
        assert_eq!(interrupt.step, Step::CollectSubject);
        assert_eq!(completed_steps(&outcome.events), vec![Step::AskContinue]);
        // Paused before collecting: the previous round is still visible.
        assert!(outcome.checkpoint.state.grade.is_some());

        let outcome = h.workflow.resume(session, "Migraine").await.unwrap();
        expect_interrupt(&outcome, InterruptKind::Answer);
        assert_eq!(outcome.checkpoint.state.subject, "Migraine");
        assert!(outcome.checkpoint.state.grade.is_none());
        assert_eq!(outcome.checkpoint.state.lessons.len(), 1);

        // The subject step itself clears summary and grade.
        match &outcome.events[0] {
            WorkflowEvent::StepCompleted { step, output } => {
                assert_eq!(*step, Step::CollectSubject);
                assert_eq!(output.as_deref(), Some("Migraine"));
            }
            other => panic!("Unexpected first event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collect_subject_clears_previous_round_before_search() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        h.workflow.resume(session, "Rest and fluids").await.unwrap();
        let paused = h.workflow.resume(session, "yes").await.unwrap();
        assert!(paused.checkpoint.state.summary.is_some());
        assert!(paused.checkpoint.state.grade.is_some());

        // Stop right after collect_subject so its own output is what is stored.
        let one_step = h.sibling().with_step_limit(1);
        let err = one_step.resume(session, "Migraine").await.unwrap_err();
        assert!(matches!(err, HealthBotError::Workflow(_)));

        let stored = h.workflow.snapshot(session).await.unwrap().unwrap();
        assert_eq!(stored.next, Step::Search);
        assert!(stored.pending.is_none());
        assert_eq!(stored.state.subject, "Migraine");
        assert!(stored.state.summary.is_none());
        assert!(stored.state.grade.is_none());
        assert_eq!(stored.state.lessons.len(), 1);
    }

    #[tokio::test]
    async fn test_answer_text_reaches_grader_verbatim() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        h.workflow.resume(session, "{{summary}}").await.unwrap();

        let grade_prompt = h.model.prompts().pop().unwrap();
        assert!(grade_prompt.contains("{{summary}}"));
        assert_eq!(grade_prompt.matches("A friendly summary.").count(), 1);
    }

    #[tokio::test]
    async fn test_failed_run_points_to_reset() {
        let h = harness();
        let session = SessionId::new();
        let short = h.sibling().with_step_limit(2);
        assert!(short.start(session, "Flu").await.is_err());

        let err = h.workflow.resume(session, "anything").await.unwrap_err();
        assert!(matches!(err, HealthBotError::InvalidInput(_)));
        assert!(err.to_string().contains("Reset the session"));

        let err = h.workflow.start(session, "Flu").await.unwrap_err();
        assert!(err.to_string().contains("Reset the session"));

        assert!(h.workflow.reset(session).await.unwrap());
        let outcome = h.workflow.start(session, "Flu").await.unwrap();
        expect_interrupt(&outcome, InterruptKind::Answer);
    }

    #[tokio::test]
    async fn test_invalid_confirmation_keeps_session_paused() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        let graded = h.workflow.resume(session, "Rest").await.unwrap();

        let err = h.workflow.resume(session, "maybe").await.unwrap_err();
        assert!(matches!(err, HealthBotError::InvalidInput(_)));

        let stored = h.workflow.snapshot(session).await.unwrap().unwrap();
        assert_eq!(stored.version, graded.checkpoint.version);
        assert_eq!(stored.next, Step::AskContinue);
        assert_eq!(
            stored.pending.map(|p| p.kind),
            Some(InterruptKind::Confirm)
        );
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected() {
        let h = harness();
        let session = SessionId::new();

        assert!(matches!(
            h.workflow.start(session, "   ").await,
            Err(HealthBotError::InvalidInput(_))
        ));

        h.workflow.start(session, "Flu").await.unwrap();
        assert!(matches!(
            h.workflow.resume(session, "").await,
            Err(HealthBotError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_start_twice_while_paused_fails() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();

        let err = h.workflow.start(session, "Cold").await.unwrap_err();
        assert!(matches!(err, HealthBotError::InvalidInput(_)));
        assert!(err.to_string().contains("resume it or reset"));
    }

    #[tokio::test]
    async fn test_finished_session_can_start_again_keeping_lessons() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();
        h.workflow.resume(session, "exit").await.unwrap();

        let outcome = h.workflow.start(session, "Cold").await.unwrap();
        expect_interrupt(&outcome, InterruptKind::Answer);
        assert_eq!(outcome.checkpoint.state.subject, "Cold");
        assert!(!outcome.checkpoint.state.is_finished);
        assert_eq!(outcome.checkpoint.state.lessons.len(), 1);
    }

    #[tokio::test]
    async fn test_resume_unknown_session() {
        let h = harness();
        let err = h.workflow.resume(SessionId::new(), "yes").await.unwrap_err();
        assert!(matches!(err, HealthBotError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_step_limit_aborts_run() {
        let h = harness();
        let workflow = h.workflow.with_step_limit(2);
        let err = workflow.start(SessionId::new(), "Flu").await.unwrap_err();
        assert!(matches!(err, HealthBotError::Workflow(_)));
    }

    #[tokio::test]
    async fn test_observer_receives_events_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let h = harness();
        let workflow = h.workflow.with_observer(tx);

        let outcome = workflow.start(SessionId::new(), "Flu").await.unwrap();
        drop(workflow);

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(received, outcome.events);
        assert!(matches!(
            received.last(),
            Some(WorkflowEvent::Interrupted(_))
        ));
    }

    #[test]
    fn test_event_messages() {
        let quiz = WorkflowEvent::StepCompleted {
            step: Step::Quiz,
            output: Some("Why?".to_string()),
        };
        assert!(quiz.message().is_none());

        let interrupt = WorkflowEvent::Interrupted(Interrupt::answer("Answer below", "Why?"));
        assert_eq!(interrupt.message().as_deref(), Some("Why?\n\nAnswer below"));

        let subject = WorkflowEvent::StepCompleted {
            step: Step::CollectSubject,
            output: Some("Flu".to_string()),
        };
        assert_eq!(subject.message().as_deref(), Some("Studying: Flu"));
    }

    #[tokio::test]
    async fn test_reset_removes_checkpoint() {
        let h = harness();
        let session = SessionId::new();
        h.workflow.start(session, "Flu").await.unwrap();

        assert_eq!(h.workflow.sessions().await.unwrap().len(), 1);

        assert!(h.workflow.reset(session).await.unwrap());
        assert!(h.workflow.snapshot(session).await.unwrap().is_none());
        assert!(h.workflow.sessions().await.unwrap().is_empty());
    }
}
