use std::io::{Read, Write};

use crate::errors::Result;
use crate::eval::Command;
use crate::state::ShellState;

/// The streams a builtin reads from and writes to
/// These are the stage's resolved input and output, not necessarily the terminal
pub struct Streams<'a> {
    pub stdin: &'a mut dyn Read,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

#[allow(clippy::type_complexity)]
type BuiltinFn = Box<dyn Fn(&mut ShellState, &Command, &mut Streams) -> Result<()> + Send + Sync>;

/// Represents a builtin function and its name
pub struct Builtin {
    pub name: String,
    function: BuiltinFn,
}

impl Builtin {
    pub fn new<F>(name: &str, function: F) -> Self
    where
        F: Fn(&mut ShellState, &Command, &mut Streams) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            function: Box::new(function),
        }
    }

    pub fn run(&self, shell: &mut ShellState, command: &Command, streams: &mut Streams) -> Result<()> {
        (self.function)(shell, command, streams)
    }
}
