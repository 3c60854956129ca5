//! CLI command implementations.

mod config;
mod doctor;
mod graph;
mod research;
mod serve;
mod sessions;
mod tutor;

pub use config::run_config;
pub use doctor::run_doctor;
pub use graph::run_graph;
pub use research::run_research;
pub use serve::run_serve;
pub use sessions::run_sessions;
pub use tutor::run_tutor;
