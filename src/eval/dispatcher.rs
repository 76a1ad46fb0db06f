use tracing::debug;

use super::parser::parse;
use super::tokenizer::tokenize;
use crate::errors::Result;
use crate::exec::{self, Registry, Terminal};
use crate::state::ShellState;

/// Turns lines of input into running pipelines
/// Owns the builtin registry and the session's standard streams
pub struct Dispatcher {
    registry: Registry,
    terminal: Terminal,
}

impl Default for Dispatcher {
    /// Initializes the `Dispatcher` with the default builtins and the inherited terminal
    fn default() -> Self {
        Self::new(Registry::default(), Terminal::inherited())
    }
}

impl Dispatcher {
    pub fn new(registry: Registry, terminal: Terminal) -> Self {
        Self { registry, terminal }
    }

    /// Evaluates and executes one line, recording its status in the session
    /// Blank lines run nothing and leave the previous status in place
    pub fn eval(&self, shell: &mut ShellState, line: &str) -> Result<i32> {
        let outcome = self.run_line(shell, line);
        shell.last_status = match &outcome {
            Ok(status) => *status,
            Err(e) => e.status(),
        };

        outcome
    }

    fn run_line(&self, shell: &mut ShellState, line: &str) -> Result<i32> {
        let tokens = tokenize(line.trim())?;
        debug!(?tokens, "tokenized");

        let pipeline = parse(tokens)?;
        debug!(?pipeline, "parsed");

        exec::run(&pipeline, shell, &self.registry, &self.terminal)
    }
}
