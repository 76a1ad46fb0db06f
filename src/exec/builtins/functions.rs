/*
A quick write-up on trip builtins:
Builtins are the commands a recovery shell needs when the container has no userland at all.
They run inside the shell process and are the only commands allowed to read or modify the
session state (working directory, environment, exit request). External executables only
receive a copy of the environment and the working directory when they are spawned.

Builtins never print their own errors; the pipeline reports them prefixed with the command name.
The exception is cat, which reports files it cannot open and carries on with the rest.
 */

use std::io;

use crate::errors::{ExecutionError, Handle, Result};
use crate::eval::Command;
use crate::exec::builtins::Streams;
use crate::state::ShellState;

pub fn change_directory(shell: &mut ShellState, command: &Command, _streams: &mut Streams) -> Result<()> {
    let target = command.args.first().map(String::as_str).unwrap_or("/");
    shell.environment.set_cwd(target)
}

pub fn working_directory(shell: &mut ShellState, _command: &Command, streams: &mut Streams) -> Result<()> {
    writeln!(streams.stdout, "{}", shell.environment.cwd().display())?;
    Ok(())
}

pub fn exit(shell: &mut ShellState, _command: &Command, _streams: &mut Streams) -> Result<()> {
    // The REPL stops before reading another line
    shell.should_exit = true;
    Ok(())
}

pub fn export(shell: &mut ShellState, command: &Command, _streams: &mut Streams) -> Result<()> {
    if let Some(assignment) = command.args.first() {
        // Malformed assignments are ignored on purpose
        if let Err(e) = shell.environment.assign(assignment) {
            tracing::debug!(%e, "export ignored");
        }
    }

    Ok(())
}

pub fn environment(shell: &mut ShellState, _command: &Command, streams: &mut Streams) -> Result<()> {
    for (key, value) in shell.environment.variables() {
        writeln!(streams.stdout, "{}={}", key, value)?;
    }

    Ok(())
}

pub fn echo(_shell: &mut ShellState, command: &Command, streams: &mut Streams) -> Result<()> {
    writeln!(streams.stdout, "{}", command.args.join(" "))?;
    Ok(())
}

pub fn list_directory(shell: &mut ShellState, command: &Command, streams: &mut Streams) -> Result<()> {
    let path_to_read = shell
        .environment
        .resolve(command.args.first().map(String::as_str).unwrap_or("."));

    let mut entries = Vec::new();
    for dir_entry in fs_err::read_dir(&path_to_read)? {
        let fs_object = dir_entry?;
        let suffix = match fs_object.file_type()?.is_dir() {
            true => "/",
            false => "",
        };

        entries.push(format!("{}{}", fs_object.file_name().to_string_lossy(), suffix));
    }

    entries.sort();
    for entry in entries {
        write!(streams.stdout, "{}  ", entry)?;
    }

    writeln!(streams.stdout)?;
    Ok(())
}

pub fn read_file(shell: &mut ShellState, command: &Command, streams: &mut Streams) -> Result<()> {
    if command.args.is_empty() {
        io::copy(&mut *streams.stdin, &mut *streams.stdout)?;
        return Ok(());
    }

    for file_name in &command.args {
        match fs_err::File::open(shell.environment.resolve(file_name)) {
            Ok(mut file) => {
                io::copy(&mut file, &mut *streams.stdout)?;
            }
            Err(e) => writeln!(streams.stderr, "cat: {}", e)?,
        }
    }

    Ok(())
}

pub fn make_directory(shell: &mut ShellState, command: &Command, _streams: &mut Streams) -> Result<()> {
    let path = command.args.first().replace_err(|| ExecutionError::MissingOperand)?;
    fs_err::create_dir_all(shell.environment.resolve(path))?;
    Ok(())
}

pub fn make_file(shell: &mut ShellState, command: &Command, _streams: &mut Streams) -> Result<()> {
    let path = command.args.first().replace_err(|| ExecutionError::MissingOperand)?;
    // * Creating requires write or append access; append never truncates an existing file
    fs_err::OpenOptions::new()
        .append(true)
        .create(true)
        .open(shell.environment.resolve(path))?;

    Ok(())
}
