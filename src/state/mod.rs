mod config;
mod environment;
mod jobs;
mod shell;

pub use config::Configuration;
pub use environment::Environment;
pub use jobs::ForegroundJobs;
pub use shell::ShellState;
