//! CLI module for HealthBot.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// HealthBot - Health Education Tutor
///
/// Researches a health topic, explains it, quizzes you and grades your answer.
#[derive(Parser, Debug)]
#[command(name = "healthbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check configuration and API credentials
    Doctor,

    /// Start an interactive tutoring session
    #[command(alias = "chat")]
    Tutor {
        /// Topic to study (prompted for if omitted)
        subject: Option<String>,

        /// Continue an existing session by id
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Run the research agent once and print its findings
    Research {
        /// What to research
        query: String,

        /// Print the raw transcript: tool call, tool result, then the answer
        #[arg(long)]
        raw: bool,
    },

    /// Start HTTP API server for tutoring sessions
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Inspect stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Print the tutoring workflow as a Mermaid diagram
    Graph,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// List sessions, most recent first
    List,

    /// Show the state of one session
    Show {
        /// Session id
        id: String,
    },

    /// Delete a session's checkpoint
    Delete {
        /// Session id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tutor_with_alias() {
        let cli = Cli::try_parse_from(["healthbot", "chat", "Asthma"]).unwrap();
        match cli.command {
            Commands::Tutor { subject, session } => {
                assert_eq!(subject.as_deref(), Some("Asthma"));
                assert!(session.is_none());
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["healthbot", "-vv", "serve"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 3000);
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }
}
