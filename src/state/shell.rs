use crossterm::style::Stylize;

use super::{Configuration, Environment, ForegroundJobs};
use crate::errors::Result;

/// Represents the shell state and provides methods for interacting with it
/// Everything a builtin may read or mutate lives here, so builtins never touch process-global state
#[derive(Debug, Clone)]
pub struct ShellState {
    pub environment: Environment,
    pub config: Configuration,
    pub jobs: ForegroundJobs,
    // Exit status of the most recent pipeline
    pub last_status: i32,
    pub should_exit: bool,
}

impl ShellState {
    /// Builds the session from the process the shell was started in
    pub fn new(config: Configuration) -> Result<Self> {
        Ok(Self::with_environment(Environment::capture()?, config))
    }

    pub fn with_environment(environment: Environment, config: Configuration) -> Self {
        Self {
            environment,
            config,
            jobs: ForegroundJobs::new(),
            last_status: 0,
            should_exit: false,
        }
    }

    /// Generates the prompt string used by the `LineEditor`
    pub fn generate_prompt(&self) -> String {
        let cwd = self.environment.cwd();
        let directory = match cwd.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => cwd.display().to_string(),
        };

        if !self.config.color {
            return format!("trip:{}$ ", directory);
        }

        let prompt_tick = match self.last_status {
            0 => "$".green(),
            _ => "$".red(),
        };

        format!(
            "{}:{}{} ",
            "trip".green().bold(),
            directory.blue().bold(),
            prompt_tick
        )
    }
}
