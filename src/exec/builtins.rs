mod command;
mod functions;

pub use command::{Builtin, Streams};

use crate::errors::Result;
use crate::eval::Command;
use crate::state::ShellState;

/// Represents the table of builtin commands
/// A name that does not resolve here is run as an external executable
pub struct Registry {
    commands: Vec<Builtin>,
}

impl Default for Registry {
    /// Initializes the `Registry` with the recovery toolkit
    #[rustfmt::skip]
    fn default() -> Self {
        let mut registry = Self::new();

        registry.add_builtin("cd", functions::change_directory);
        registry.add_builtin("pwd", functions::working_directory);
        registry.add_builtin("exit", functions::exit);
        registry.add_builtin("export", functions::export);
        registry.add_builtin("env", functions::environment);
        registry.add_builtin("echo", functions::echo);
        registry.add_builtin("ls", functions::list_directory);
        registry.add_builtin("cat", functions::read_file);
        registry.add_builtin("mkdir", functions::make_directory);
        registry.add_builtin("touch", functions::make_file);

        registry
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Adds a builtin to the `Registry`, replacing any existing one with the same name
    pub fn add_builtin<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&mut ShellState, &Command, &mut Streams) -> Result<()> + Send + Sync + 'static,
    {
        self.commands.retain(|command| command.name != name);
        self.commands.push(Builtin::new(name, function))
    }

    /// Attempts to locate a builtin command by name
    pub fn resolve(&self, command_name: &str) -> Option<&Builtin> {
        self.commands
            .iter()
            .find(|command| command.name == command_name)
    }
}
