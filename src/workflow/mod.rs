//! Stateful tutoring workflow.
//!
//! A fixed sequence of steps (collect subject, search, summarize, quiz,
//! await answer, grade, ask to continue) that pauses for human input and is
//! checkpointed per session.

mod engine;
mod state;
mod step;

pub use engine::{RunOutcome, RunStatus, TutorWorkflow, WorkflowEvent};
pub use state::{GradeResult, LessonRecord, TutorState};
pub use step::{Interrupt, InterruptKind, Step};
