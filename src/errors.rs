use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::eval::symbols::Operator;

/// `Result` alias which automatically uses `ShellError` as the error type.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for the shell.
/// Every error is recovered at the REPL boundary; the variant decides how it is reported.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Error type for malformed token streams.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unclosed quote: {0}")]
    UnclosedQuote(char),
}

/// Error type for malformed pipeline structure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command before pipe")]
    EmptyCommandBeforePipe,
    #[error("empty command after pipe")]
    EmptyCommandAfterPipe,
    #[error("missing filename after redirection operator `{0}`")]
    MissingRedirectTarget(Operator),
}

/// Error type for errors which occur while a pipeline stage runs.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("command not found: {0}")]
    CommandNotFound(String),
    #[error("cannot open input: {0}")]
    InputRedirect(#[source] io::Error),
    #[error("cannot open output: {0}")]
    OutputRedirect(#[source] io::Error),
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("error starting {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait for {name}: {source}")]
    Wait {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("missing operand")]
    MissingOperand,
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Error type for errors which occur while building or mutating session state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to open configuration file: {0}")]
    FailedToOpenConfigFile(PathBuf),
    #[error("Failed to read configuration file {0}: line {1}")]
    FailedToReadConfigFile(PathBuf, usize),
    #[error("Malformed assignment: {0}")]
    MalformedAssignment(String),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to determine working directory: {0}")]
    UnknownWorkingDirectory(#[source] io::Error),
}

impl ShellError {
    /// The status a line that failed with this error leaves behind
    pub fn status(&self) -> i32 {
        match self {
            ShellError::Syntax(_) | ShellError::Parse(_) => 2,
            ShellError::Execution(ExecutionError::CommandNotFound(_)) => 127,
            ShellError::Execution(ExecutionError::Spawn { .. }) => 126,
            _ => 1,
        }
    }
}

impl From<io::Error> for ShellError {
    fn from(error: io::Error) -> Self {
        Self::Execution(ExecutionError::Io(error))
    }
}

pub trait Handle<T> {
    /// Replaces any error kind with a new one built by the provided closure.
    /// Useful in situations where the underlying error provides no additional clarity.
    fn replace_err<E: Into<ShellError>>(self, new_error: impl FnOnce() -> E) -> Result<T>;
}

impl<T, E> Handle<T> for std::result::Result<T, E> {
    fn replace_err<F: Into<ShellError>>(self, new_error: impl FnOnce() -> F) -> Result<T> {
        self.map_err(|_| new_error().into())
    }
}

impl<T> Handle<T> for Option<T> {
    fn replace_err<E: Into<ShellError>>(self, new_error: impl FnOnce() -> E) -> Result<T> {
        self.ok_or_else(|| new_error().into())
    }
}

/// Whether the error is a broken pipe, which builtins treat as a normal end of output
pub fn is_broken_pipe(error: &ShellError) -> bool {
    matches!(
        error,
        ShellError::Execution(ExecutionError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe
    )
}
