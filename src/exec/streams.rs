//! Descriptor plumbing for pipeline stages.
//!
//! A stage's input and output are owned values: dropping one closes the underlying descriptor,
//! so a stage releases its redirection files and pipe ends as soon as it has been spawned or
//! has finished running.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Stdio;

use nix::fcntl::OFlag;
use nix::unistd::pipe2;

use crate::errors::{ExecutionError, Result};

/// Where one of the shell's own standard streams points
#[derive(Debug)]
pub enum SessionStream {
    Inherited,
    // Only the test suites point the session at files
    #[cfg_attr(not(test), allow(dead_code))]
    Redirected(File),
}

impl SessionStream {
    fn try_clone(&self) -> io::Result<Option<File>> {
        match self {
            SessionStream::Inherited => Ok(None),
            SessionStream::Redirected(file) => file.try_clone().map(Some),
        }
    }
}

/// The standard streams of the shell session itself
/// Stages with no redirection or pipe on a side fall back to these
#[derive(Debug)]
pub struct Terminal {
    pub stdin: SessionStream,
    pub stdout: SessionStream,
    pub stderr: SessionStream,
}

impl Terminal {
    /// The streams the shell process was started with
    pub fn inherited() -> Self {
        Self {
            stdin: SessionStream::Inherited,
            stdout: SessionStream::Inherited,
            stderr: SessionStream::Inherited,
        }
    }

    pub fn stderr_writer(&self) -> io::Result<Box<dyn Write + Send>> {
        Ok(match self.stderr.try_clone()? {
            Some(file) => Box::new(file),
            None => Box::new(io::stderr()),
        })
    }

    pub fn stderr_stdio(&self) -> io::Result<Stdio> {
        Ok(match self.stderr.try_clone()? {
            Some(file) => file.into(),
            None => Stdio::inherit(),
        })
    }
}

/// Where a stage reads from
#[derive(Debug)]
pub enum StageInput {
    Session,
    File(File),
    Pipe(File),
}

impl StageInput {
    /// Opens an input redirection read-only
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs_err::File::open(path).map_err(ExecutionError::InputRedirect)?;
        Ok(StageInput::File(file.into_parts().0))
    }

    pub fn into_reader(self, terminal: &Terminal) -> io::Result<Box<dyn Read + Send>> {
        Ok(match self {
            StageInput::File(file) | StageInput::Pipe(file) => Box::new(file),
            StageInput::Session => match terminal.stdin.try_clone()? {
                Some(file) => Box::new(file),
                None => Box::new(io::stdin()),
            },
        })
    }

    pub fn into_stdio(self, terminal: &Terminal) -> io::Result<Stdio> {
        Ok(match self {
            StageInput::File(file) | StageInput::Pipe(file) => file.into(),
            StageInput::Session => match terminal.stdin.try_clone()? {
                Some(file) => file.into(),
                None => Stdio::inherit(),
            },
        })
    }
}

/// Where a stage writes to
#[derive(Debug)]
pub enum StageOutput {
    Session,
    File(File),
    Pipe(File),
}

impl StageOutput {
    /// Opens an output redirection, creating the file and truncating or appending to it
    pub fn open(path: &Path, append: bool) -> Result<Self> {
        let file = fs_err::OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(ExecutionError::OutputRedirect)?;

        Ok(StageOutput::File(file.into_parts().0))
    }

    pub fn is_pipe(&self) -> bool {
        matches!(self, StageOutput::Pipe(_))
    }

    pub fn into_writer(self, terminal: &Terminal) -> io::Result<Box<dyn Write + Send>> {
        Ok(match self {
            StageOutput::File(file) | StageOutput::Pipe(file) => Box::new(file),
            StageOutput::Session => match terminal.stdout.try_clone()? {
                Some(file) => Box::new(file),
                None => Box::new(io::stdout()),
            },
        })
    }

    pub fn into_stdio(self, terminal: &Terminal) -> io::Result<Stdio> {
        Ok(match self {
            StageOutput::File(file) | StageOutput::Pipe(file) => file.into(),
            StageOutput::Session => match terminal.stdout.try_clone()? {
                Some(file) => file.into(),
                None => Stdio::inherit(),
            },
        })
    }
}

/// Creates an anonymous pipe, returning its (read, write) ends
/// * Both ends are close-on-exec, so only the stage that is handed an end keeps it open
pub fn pipe() -> Result<(StageInput, StageOutput)> {
    let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(ExecutionError::Pipe)?;
    Ok((
        StageInput::Pipe(File::from(read)),
        StageOutput::Pipe(File::from(write)),
    ))
}
