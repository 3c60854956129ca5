//! Workflow diagram command.

use crate::workflow::Step;

/// Print the tutoring workflow as a Mermaid flowchart.
pub fn run_graph() {
    println!("{}", Step::mermaid());
}
