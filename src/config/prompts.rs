//! Prompt templates for healthbot.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub research: ResearchPrompts,
    pub tutor: TutorPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the research agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchPrompts {
    pub system: String,
}

impl Default for ResearchPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant.You must refer to the result of toolcall. \
                     If there is no result of toolcall, call tools."
                .to_string(),
        }
    }
}

/// Prompts for the tutoring workflow steps and interrupts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    /// Query handed to the research agent.
    pub search_query: String,
    pub summarize: String,
    pub quiz: String,
    pub grade: String,
    /// Shown with the quiz question while waiting for an answer.
    pub answer_instruction: String,
    /// Shown when asking for the next subject.
    pub new_subject: String,
    /// Shown when asking whether to continue.
    pub ask_continue: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            search_query: "Provide detailed medical/health information about {{subject}} for patient education."
                .to_string(),

            summarize: r#"You are a health education assistant. Please write a 3-4 paragraph popular science summary based on the search results below.
Requirements:
1. Strictly only use the provided search results and do not add external knowledge.
2. The tone is easy to understand, suitable for patients to read.

SEARCH RESULTS: {{context}}"#
                .to_string(),

            quiz: r#"Based on the following summary, generate a very challenging but fair question.
Requirements:
1. Questions must be able to be answered just by reading the summary.
2. Don't give options, it's an open-ended question.

Abstract content: {{summary}}"#
                .to_string(),

            grade: r#"You are an unbiased mentor. Please rate the user's responses based on the summary provided.

References (summary): {{summary}}
Question: {{question}}
User answer: {{answer}}

Please give a grade (A/B/C... ) and brief suggestions for improvement."#
                .to_string(),

            answer_instruction: "Read the summary and answer the question (type 'exit' to finish)."
                .to_string(),

            new_subject: "If you want to continue learning, enter a new study topic:".to_string(),

            ask_continue: "Do you want to learn a new topic? (yes/no)".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let research_path = custom_path.join("research.toml");
            if research_path.exists() {
                let content = std::fs::read_to_string(&research_path)?;
                prompts.research = toml::from_str(&content)?;
            }

            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are filled in one pass; substituted text is never
    /// expanded again. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
        });
        re.replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &[(&str, &str)]) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.to_string(), value.to_string());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.research.system.is_empty());
        assert!(prompts.tutor.summarize.contains("{{context}}"));
        assert!(prompts.tutor.grade.contains("{{answer}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), "SECRET SUMMARY".to_string());
        vars.insert("question".to_string(), "Q?".to_string());
        vars.insert("answer".to_string(), "{{summary}} and {{question}}".to_string());

        for _ in 0..50 {
            let result = Prompts::render("Q: {{question}} A: {{answer}} R: {{summary}}", &vars);
            assert_eq!(
                result,
                "Q: Q? A: {{summary}} and {{question}} R: SECRET SUMMARY"
            );
        }
    }

    #[test]
    fn test_unknown_placeholder_left_alone() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("Hi {{nobody}}", &vars), "Hi {{nobody}}");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("audience".to_string(), "adults".to_string());
        prompts
            .variables
            .insert("subject".to_string(), "ignored".to_string());

        let rendered =
            prompts.render_with_custom("{{subject}} for {{audience}}", &[("subject", "Asthma")]);
        assert_eq!(rendered, "Asthma for adults");
    }

    #[test]
    fn test_load_custom_tutor_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tutor.toml"),
            "quiz = \"Ask one question about {{summary}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.tutor.quiz, "Ask one question about {{summary}}");
        // Unspecified keys keep their defaults.
        assert!(prompts.tutor.grade.contains("{{question}}"));
        assert!(!prompts.research.system.is_empty());
    }
}
