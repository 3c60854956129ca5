//! Workflow steps, their fixed topology, and interrupt payloads.

use serde::{Deserialize, Serialize};

/// A node of the tutoring workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CollectSubject,
    Search,
    Summarize,
    Quiz,
    AwaitAnswer,
    Grade,
    AskContinue,
    Done,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::CollectSubject,
        Step::Search,
        Step::Summarize,
        Step::Quiz,
        Step::AwaitAnswer,
        Step::Grade,
        Step::AskContinue,
        Step::Done,
    ];

    /// Entry point of every run.
    pub fn first() -> Self {
        Step::CollectSubject
    }

    /// Unconditional successor. `AskContinue` branches and has none.
    pub fn successor(&self) -> Option<Step> {
        match self {
            Step::CollectSubject => Some(Step::Search),
            Step::Search => Some(Step::Summarize),
            Step::Summarize => Some(Step::Quiz),
            Step::Quiz => Some(Step::AwaitAnswer),
            Step::AwaitAnswer => Some(Step::Grade),
            Step::Grade => Some(Step::AskContinue),
            Step::AskContinue | Step::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::CollectSubject => "collect_subject",
            Step::Search => "search",
            Step::Summarize => "summarize",
            Step::Quiz => "quiz",
            Step::AwaitAnswer => "await_answer",
            Step::Grade => "grade",
            Step::AskContinue => "ask_continue",
            Step::Done => "done",
        }
    }

    /// Mermaid flowchart of the workflow.
    pub fn mermaid() -> String {
        let mut lines = vec!["graph TD;".to_string()];
        lines.push(format!("    __start__ --> {};", Step::first()));
        for step in Step::ALL {
            if let Some(next) = step.successor() {
                lines.push(format!("    {} --> {};", step, next));
            }
        }
        lines.push(format!("    {} -. yes .-> {};", Step::AskContinue, Step::CollectSubject));
        lines.push(format!("    {} -. no .-> {};", Step::AskContinue, Step::Done));
        lines.join("\n")
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("Unknown workflow step: {}", s))
    }
}

/// Kind of value an interrupt waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptKind {
    /// Free text naming a new subject.
    Subject,
    /// Free text answering the quiz question.
    Answer,
    /// "yes" or "no".
    Confirm,
}

/// A pending request for human input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    /// Step that resumes with the value.
    pub step: Step,
    pub kind: InterruptKind,
    /// Instruction shown to the user.
    pub prompt: String,
    /// Quiz question, for answer interrupts.
    pub question: Option<String>,
}

impl Interrupt {
    pub fn subject(prompt: &str) -> Self {
        Self {
            step: Step::CollectSubject,
            kind: InterruptKind::Subject,
            prompt: prompt.to_string(),
            question: None,
        }
    }

    pub fn answer(prompt: &str, question: &str) -> Self {
        Self {
            step: Step::AwaitAnswer,
            kind: InterruptKind::Answer,
            prompt: prompt.to_string(),
            question: Some(question.to_string()),
        }
    }

    pub fn confirm(prompt: &str) -> Self {
        Self {
            step: Step::AskContinue,
            kind: InterruptKind::Confirm,
            prompt: prompt.to_string(),
            question: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_chain_reaches_ask_continue() {
        let mut step = Step::first();
        let mut visited = vec![step];
        while let Some(next) = step.successor() {
            visited.push(next);
            step = next;
        }
        assert_eq!(
            visited,
            vec![
                Step::CollectSubject,
                Step::Search,
                Step::Summarize,
                Step::Quiz,
                Step::AwaitAnswer,
                Step::Grade,
                Step::AskContinue,
            ]
        );
    }

    #[test]
    fn test_step_names_roundtrip() {
        for step in Step::ALL {
            assert_eq!(step.as_str().parse::<Step>().unwrap(), step);
            assert_eq!(
                serde_json::to_value(step).unwrap(),
                serde_json::Value::String(step.as_str().to_string())
            );
        }
        assert!("human_input".parse::<Step>().is_err());
    }

    #[test]
    fn test_mermaid_contains_branch() {
        let chart = Step::mermaid();
        assert!(chart.starts_with("graph TD;"));
        assert!(chart.contains("__start__ --> collect_subject;"));
        assert!(chart.contains("quiz --> await_answer;"));
        assert!(chart.contains("ask_continue -. yes .-> collect_subject;"));
        assert!(chart.contains("ask_continue -. no .-> done;"));
    }
}
