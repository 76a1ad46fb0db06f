use std::io;
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use tracing::{error, warn};

use crate::errors::Result;
use crate::state::ShellState;

pub struct LineEditor {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl LineEditor {
    /// Creates a LineEditor, loading history from the given file if there is one
    pub fn new(history_file: Option<&Path>) -> std::result::Result<Self, ReadlineError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .build();

        let mut editor = DefaultEditor::with_config(config)?;
        if let Some(path) = history_file {
            // * A missing file is created on the first save
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), %e, "no history loaded");
            }
        }

        Ok(Self {
            editor,
            history_file: history_file.map(Path::to_path_buf),
        })
    }

    /// Prompts until a non-blank line is entered
    /// Returns `None` at end of input; an interrupt discards the line and prompts again
    /// * A line that is not valid UTF-8 has already been consumed when it is reported, so the
    /// * caller can move on to the next one; any other failure of the input ends the session
    pub fn prompt_and_read_line(&mut self, shell: &ShellState) -> Result<Option<String>> {
        loop {
            match self.editor.readline(&shell.generate_prompt()) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    self.remember(&line);
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    return Err(e.into())
                }
                Err(e) => {
                    error!(%e, "cannot read input");
                    return Ok(None);
                }
            }
        }
    }

    fn remember(&mut self, line: &str) {
        let Some(path) = &self.history_file else {
            return;
        };

        // * Fails for lines already in the history or starting with a space; neither needs handling
        let _ = self.editor.add_history_entry(line);
        if let Err(e) = self.editor.save_history(path) {
            warn!(path = %path.display(), %e, "failed to save history");
        }
    }
}
