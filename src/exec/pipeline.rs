use std::io::{Read, Write};
use std::process::Child;
use std::thread::{self, Scope, ScopedJoinHandle};

use nix::errno::Errno;
use nix::sys::wait::{waitid, Id, WaitPidFlag};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::builtins::{Builtin, Registry, Streams};
use super::executable::{status_code, Executable};
use super::streams::{pipe, StageInput, StageOutput, Terminal};
use crate::errors::{is_broken_pipe, ExecutionError, Result};
use crate::eval::Command;
use crate::state::{ForegroundJobs, ShellState};

/// A stage that has been started and has yet to be joined
enum Stage<'scope> {
    Child { name: String, child: Child },
    Thread { name: String, handle: ScopedJoinHandle<'scope, i32> },
    Done { name: String, status: i32 },
}

/// Runs every stage of a pipeline and waits for all of them, returning the status of the last stage
/// If a stage cannot be started, the stages that were already started are still joined
/// before the error is returned
pub fn run(
    pipeline: &[Command],
    shell: &mut ShellState,
    registry: &Registry,
    terminal: &Terminal,
) -> Result<i32> {
    if pipeline.is_empty() {
        return Ok(shell.last_status);
    }

    thread::scope(|scope| {
        let mut stages = Vec::with_capacity(pipeline.len());
        let started = start_stages(scope, pipeline, shell, registry, terminal, &mut stages);
        let statuses = join_stages(stages, &shell.jobs);
        started?;

        let Some(((_, last), earlier)) = statuses.split_last() else {
            return Ok(0);
        };
        for (name, status) in earlier.iter().filter(|(_, status)| *status != 0) {
            warn!(stage = %name, status, "pipeline stage failed");
        }

        Ok(*last)
    })
}

fn start_stages<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    pipeline: &'env [Command],
    shell: &mut ShellState,
    registry: &'env Registry,
    terminal: &Terminal,
    stages: &mut Vec<Stage<'scope>>,
) -> Result<()> {
    let mut next_input = StageInput::Session;

    for (index, command) in pipeline.iter().enumerate() {
        let last = index + 1 == pipeline.len();

        let piped_input = std::mem::replace(&mut next_input, StageInput::Session);
        let input = match &command.stdin_file {
            Some(path) => StageInput::open(&shell.environment.resolve(path))?,
            None => piped_input,
        };

        // A stage redirected to a file still gets a pipe, so the next stage reads end of input
        // instead of the terminal
        let output = match last {
            true => StageOutput::Session,
            false => {
                let (read, write) = pipe()?;
                next_input = read;
                write
            }
        };
        let output = match &command.stdout_file {
            Some(path) => StageOutput::open(&shell.environment.resolve(path), command.append)?,
            None => output,
        };

        match registry.resolve(&command.name) {
            Some(builtin) => {
                let stdin = input.into_reader(terminal)?;
                let background = output.is_pipe();
                let stdout = output.into_writer(terminal)?;
                let stderr = terminal.stderr_writer()?;

                if background {
                    let mut snapshot = shell.clone();
                    let handle = scope.spawn(move || {
                        run_builtin(builtin, &mut snapshot, command, stdin, stdout, stderr)
                    });
                    stages.push(Stage::Thread {
                        name: command.name.clone(),
                        handle,
                    });
                } else {
                    let status = run_builtin(builtin, shell, command, stdin, stdout, stderr);
                    stages.push(Stage::Done {
                        name: command.name.clone(),
                        status,
                    });
                }
            }
            None => {
                let executable = Executable::resolve(&command.name, shell)?;
                let child = executable.spawn(
                    &command.name,
                    &command.args,
                    shell,
                    input.into_stdio(terminal)?,
                    output.into_stdio(terminal)?,
                    terminal.stderr_stdio()?,
                )?;

                debug!(pid = child.id(), path = %executable.path().display(), "spawned");
                shell.jobs.register(child.id());
                stages.push(Stage::Child {
                    name: command.name.clone(),
                    child,
                });
            }
        }
    }

    Ok(())
}

/// Runs a builtin to completion against the given streams and converts the outcome into a status
/// The output is closed when this returns, which is what signals end of input to a piped consumer
fn run_builtin(
    builtin: &Builtin,
    shell: &mut ShellState,
    command: &Command,
    mut stdin: Box<dyn Read + Send>,
    mut stdout: Box<dyn Write + Send>,
    mut stderr: Box<dyn Write + Send>,
) -> i32 {
    let mut streams = Streams {
        stdin: &mut stdin,
        stdout: &mut stdout,
        stderr: &mut stderr,
    };

    let outcome = builtin
        .run(shell, command, &mut streams)
        .and_then(|()| Ok(streams.stdout.flush()?));

    match outcome {
        Ok(()) => 0,
        // The consumer has gone away; nothing else would have read the rest
        Err(e) if is_broken_pipe(&e) => 0,
        Err(e) => {
            if let Err(report) = writeln!(streams.stderr, "{}: {}", command.name, e) {
                debug!(%report, "could not report builtin failure");
            }
            1
        }
    }
}

fn join_stages(stages: Vec<Stage>, jobs: &ForegroundJobs) -> Vec<(String, i32)> {
    stages
        .into_iter()
        .map(|stage| match stage {
            Stage::Child { name, mut child } => {
                // A zombie keeps its pid, so nothing can be signalled by mistake once released
                await_exit(child.id());
                jobs.release(child.id());

                let status = match child.wait() {
                    Ok(status) => status_code(status),
                    Err(source) => {
                        let error = ExecutionError::Wait {
                            name: name.clone(),
                            source,
                        };
                        warn!(%error);
                        1
                    }
                };

                debug!(pid = child.id(), status, "reaped");
                (name, status)
            }
            Stage::Thread { name, handle } => {
                let status = handle.join().unwrap_or_else(|_| {
                    warn!(stage = %name, "builtin panicked");
                    1
                });
                (name, status)
            }
            Stage::Done { name, status } => (name, status),
        })
        .collect()
}

/// Blocks until the child has exited without reaping it
/// * On failure the caller's reap still waits for the child, only the release happens early
fn await_exit(pid: u32) {
    loop {
        let id = Id::Pid(Pid::from_raw(pid as i32));
        match waitid(id, WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT) {
            Ok(_) => return,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                debug!(pid, %e, "could not wait for exit");
                return;
            }
        }
    }
}
