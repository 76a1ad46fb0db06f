use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as Process, ExitStatus, Stdio};

use is_executable::IsExecutable;

use crate::errors::{ExecutionError, Handle, Result};
use crate::signals::forwarded_signals;
use crate::state::ShellState;

/// Represents an executable (external command) whose path has been resolved
#[derive(Debug)]
pub struct Executable {
    path: PathBuf,
}

impl Executable {
    /// Locates the executable for a command name
    /// * Names containing a slash are used as given (relative to the working directory);
    /// * otherwise the base search path is consulted first, then the session's PATH
    pub fn resolve(name: &str, shell: &ShellState) -> Result<Self> {
        let environment = &shell.environment;
        if name.contains('/') {
            return Ok(Self {
                path: environment.resolve(name),
            });
        }

        let candidate = environment.resolve(&shell.config.base_path).join(name);
        if candidate.exists() {
            return Ok(Self { path: candidate });
        }

        environment
            .get("PATH")
            .unwrap_or_default()
            .split(':')
            .filter(|dir| !dir.is_empty())
            .map(|dir| environment.resolve(dir).join(name))
            .find(|path| path.is_file() && path.is_executable())
            .map(|path| Self { path })
            .replace_err(|| ExecutionError::CommandNotFound(name.to_owned()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts the process with the given standard streams and the session's environment
    /// The stream handles are consumed, so the parent's copies are closed once the child has started
    pub fn spawn(
        &self,
        name: &str,
        arguments: &[String],
        shell: &ShellState,
        stdin: Stdio,
        stdout: Stdio,
        stderr: Stdio,
    ) -> Result<Child> {
        let mut process = Process::new(&self.path);
        process
            .args(arguments)
            .env_clear()
            .envs(shell.environment.variables())
            .current_dir(shell.environment.cwd())
            .stdin(stdin)
            .stdout(stdout)
            .stderr(stderr);

        let forwarded = forwarded_signals();
        // SAFETY: the hook runs between fork and exec and only calls pthread_sigmask,
        // which is async-signal-safe
        unsafe {
            process.pre_exec(move || {
                forwarded.thread_unblock()?;
                Ok(())
            });
        }

        let child = process.spawn().map_err(|source| ExecutionError::Spawn {
            name: name.to_owned(),
            source,
        })?;

        // The builder still owns the parent's copies of the stage descriptors
        drop(process);
        Ok(child)
    }
}

/// Converts a child's exit status into a shell status code
/// * 128 + N when the child was killed by signal N, as other shells report it
pub fn status_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use crate::errors::ShellError;
    use crate::state::{Configuration, Environment};

    fn shell_with(cwd: &Path, base_path: &Path, path_variable: &str) -> ShellState {
        let environment = Environment::new(
            cwd.to_path_buf(),
            vec![("PATH".to_string(), path_variable.to_string())],
        );
        let config = Configuration {
            base_path: base_path.to_path_buf(),
            ..Configuration::default()
        };
        ShellState::with_environment(environment, config)
    }

    fn write_script(path: &Path) {
        fs_err::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs_err::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn base_path_wins_over_path_variable() {
        //given
        let base = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        write_script(&base.path().join("tool"));
        write_script(&other.path().join("tool"));
        let path_variable = other.path().to_string_lossy().to_string();
        let shell = shell_with(Path::new("/"), base.path(), &path_variable);

        //when
        let executable = Executable::resolve("tool", &shell).unwrap();

        //then
        assert_eq!(executable.path(), base.path().join("tool"));
    }

    #[test]
    fn falls_back_to_path_variable() {
        let base = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        write_script(&other.path().join("tool"));
        let path_variable = format!("/nonexistent::{}", other.path().display());
        let shell = shell_with(Path::new("/"), base.path(), &path_variable);

        let executable = Executable::resolve("tool", &shell).unwrap();

        assert_eq!(executable.path(), other.path().join("tool"));
    }

    #[test]
    fn path_lookup_skips_non_executable_files() {
        let base = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        fs_err::write(other.path().join("notes"), "plain text").unwrap();
        let path_variable = other.path().to_string_lossy().to_string();
        let shell = shell_with(Path::new("/"), base.path(), &path_variable);

        let error = Executable::resolve("notes", &shell).unwrap_err();

        assert!(matches!(
            error,
            ShellError::Execution(ExecutionError::CommandNotFound(name)) if name == "notes"
        ));
    }

    #[test]
    fn names_with_a_slash_are_relative_to_the_working_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let shell = shell_with(cwd.path(), Path::new("/bin"), "");

        let executable = Executable::resolve("./run.sh", &shell).unwrap();

        assert_eq!(executable.path(), cwd.path().join("./run.sh"));
    }

    #[test]
    fn children_receive_signals_blocked_in_the_shell() {
        // The mask is per thread, so block it on a thread of our own
        let status = std::thread::spawn(|| {
            //given
            forwarded_signals().thread_block().unwrap();
            let shell = shell_with(Path::new("/"), Path::new("/bin"), "/usr/bin:/bin");
            let Ok(executable) = Executable::resolve("sleep", &shell) else {
                // No sleep binary in this environment
                return None;
            };
            let arguments = vec!["30".to_string()];
            let mut child = executable
                .spawn("sleep", &arguments, &shell, Stdio::null(), Stdio::null(), Stdio::null())
                .unwrap();
            shell.jobs.register(child.id());

            //when
            let delivered = shell.jobs.forward(nix::sys::signal::Signal::SIGTERM);
            let status = child.wait().unwrap();
            shell.jobs.release(child.id());

            assert_eq!(delivered, 1);
            Some(status_code(status))
        })
        .join()
        .unwrap();

        //then
        if let Some(status) = status {
            assert_eq!(status, 128 + 15);
        }
    }

    #[test]
    fn spawn_failure_names_the_command() {
        let cwd = tempfile::tempdir().unwrap();
        let shell = shell_with(cwd.path(), Path::new("/bin"), "");
        let executable = Executable::resolve("./missing", &shell).unwrap();

        let error = executable
            .spawn("./missing", &[], &shell, Stdio::null(), Stdio::null(), Stdio::null())
            .unwrap_err();

        assert!(error.to_string().starts_with("error starting ./missing"));
    }
}
