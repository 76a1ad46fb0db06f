mod errors;
mod eval;
mod exec;
mod signals;
mod state;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use errors::ShellError;
use eval::{Dispatcher, LineEditor};
use state::{Configuration, ShellState};

/// A minimal shell for recovering containers that ship without a userland
#[derive(Parser, Debug)]
#[command(name = "trip", version, about)]
struct Cli {
    #[arg(short = 'c', value_name = "LINE", help = "Run a single line and exit with its status")]
    command: Option<String>,
    #[arg(long, env = "TRIP_PATH", help = "The directory searched first for commands")]
    base_path: Option<PathBuf>,
    #[arg(long, env = "TRIP_CONFIG", help = "The configuration file to load")]
    config: Option<PathBuf>,
    #[arg(long, help = "Disable prompt styling")]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    // The ShellState type stores all of the state for the session: its configuration,
    // its environment and working directory, and the pipeline currently in the foreground
    let mut shell = ShellState::new(configure(&cli)?)?;
    // Interrupts go to the running pipeline, never to the shell itself
    signals::forward_interrupts(shell.jobs.clone()).context("failed to set up signal handling")?;
    // The Dispatcher type turns a line into a pipeline and runs it through builtins or executables
    let dispatcher = Dispatcher::default();

    if let Some(line) = &cli.command {
        let status = match dispatcher.eval(&mut shell, line) {
            Ok(status) => status,
            Err(e) => {
                let status = e.status();
                handle_error(e, &shell);
                status
            }
        };

        std::process::exit(status);
    }

    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("Trip Shell v{}", env!("CARGO_PKG_VERSION"));
    }

    // The LineEditor type reads lines from the user and keeps history when configured to
    let mut line_editor = LineEditor::new(shell.config.history_file.as_deref())?;
    while !shell.should_exit {
        let line = match line_editor.prompt_and_read_line(&shell) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                shell.last_status = e.status();
                handle_error(e, &shell);
                continue;
            }
        };

        if let Err(e) = dispatcher.eval(&mut shell, &line) {
            handle_error(e, &shell);
        }
    }

    Ok(())
}

/// Layers the configuration file, environment and flags, in increasing precedence
fn configure(cli: &Cli) -> Result<Configuration> {
    let mut config = match &cli.config {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };

    if let Some(base_path) = &cli.base_path {
        config.base_path = base_path.clone();
    }

    if cli.no_color || !std::io::stdout().is_terminal() {
        config.color = false;
    }

    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TRIP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// Prints an appropriate error message for the given error, if applicable
fn handle_error(error: ShellError, shell: &ShellState) {
    match error {
        ShellError::Syntax(e) => println!("Syntax error: {}", e),
        ShellError::Parse(e) => println!("Parse error: {}", e),
        e => {
            if shell.config.show_errors {
                println!("Error: {}", e);
            }
        }
    }
}
