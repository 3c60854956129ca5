//! Conversation state carried between tutoring steps.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Flat record of one tutoring session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorState {
    /// Topic the user is currently learning.
    pub subject: String,
    /// Raw search tool output (JSON text).
    pub search_results: String,
    pub summary: Option<String>,
    pub quiz_question: String,
    pub user_answer: String,
    /// "Grade: X\nJustification: ..." for the latest answer.
    pub grade: Option<String>,
    pub continue_choice: String,
    /// Number of graded rounds.
    pub iteration_count: u32,
    pub is_finished: bool,
    /// Completed rounds, oldest first. Never truncated within a session.
    pub lessons: Vec<LessonRecord>,
}

impl TutorState {
    pub fn with_subject(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            ..Self::default()
        }
    }

    /// Clear the per-round outputs so the cycle can restart.
    pub fn clear_round(&mut self) {
        self.summary = None;
        self.grade = None;
    }
}

/// One graded quiz round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub subject: String,
    pub question: String,
    pub answer: String,
    pub score: String,
    pub justification: String,
}

/// Grading result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GradeResult {
    /// Grades A, B, C, D, or F
    pub score: String,
    /// Detailed justification for the grade
    pub justification: String,
}

impl GradeResult {
    /// Letter grade extracted from the score, e.g. "b+ (good)" becomes "B+".
    /// Falls back to the trimmed score when no letter grade is present.
    pub fn letter(&self) -> String {
        static LETTER: OnceLock<Regex> = OnceLock::new();
        let re = LETTER.get_or_init(|| {
            Regex::new(r"(?i)^\s*(?:grade\s*:?\s*)?([a-f][+-]?)(?:[^a-z]|$)")
                .expect("letter grade pattern is valid")
        });
        re.captures(&self.score)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_else(|| self.score.trim().to_string())
    }

    /// Text stored in `TutorState::grade`.
    pub fn display(&self) -> String {
        format!(
            "Grade: {}\nJustification: {}",
            self.letter(),
            self.justification.trim()
        )
    }
}
