use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use fs_err::File;

use crate::errors::{Handle, Result, StateError};

/// The directory searched first for unqualified external commands
pub const DEFAULT_BASE_PATH: &str = "/bin";

// Represents any settings for the shell, most of which can be configured by the user
#[derive(Debug, Clone)]
pub struct Configuration {
    // The directory consulted first when resolving an external command name
    pub base_path: PathBuf,
    // Whether or not to print execution errors when a pipeline fails
    pub show_errors: bool,
    // Whether the prompt is styled with terminal colors
    pub color: bool,
    // Where line-editor history is kept, if anywhere
    pub history_file: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            show_errors: true,
            color: true,
            history_file: None,
        }
    }
}

impl Configuration {
    // Scans a configuration file for settings and updates the configuration accordingly
    pub fn from_file(filename: &Path) -> Result<Self> {
        let filename = filename.to_path_buf();
        let mut config = Self::default();
        let file = File::open(&filename)
            .replace_err(|| StateError::FailedToOpenConfigFile(filename.clone()))?;
        let reader = BufReader::new(file);

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let malformed = || StateError::FailedToReadConfigFile(filename.clone(), line_number);

            let line = line.replace_err(malformed)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once(':').replace_err(malformed)?;
            let value = value.trim();

            match key.trim() {
                "base-path" => config.base_path = PathBuf::from(value),
                "show-errors" => config.show_errors = value.parse().replace_err(malformed)?,
                "color" => config.color = value.parse().replace_err(malformed)?,
                "history-file" => config.history_file = Some(PathBuf::from(value)),
                _ => return Err(malformed().into()),
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::errors::ShellError;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_search_bin_first() {
        let config = Configuration::default();
        assert_eq!(config.base_path, PathBuf::from("/bin"));
        assert!(config.show_errors);
        assert!(config.history_file.is_none());
    }

    #[test]
    fn reads_every_key() {
        //given
        let file = config_file(
            "# recovery profile\n\
             base-path: /usr/local/bin\n\
             \n\
             show-errors: false\n\
             color: false\n\
             history-file: /tmp/trip_history\n",
        );

        //when
        let config = Configuration::from_file(file.path()).unwrap();

        //then
        assert_eq!(config.base_path, PathBuf::from("/usr/local/bin"));
        assert!(!config.show_errors);
        assert!(!config.color);
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/trip_history")));
    }

    #[test]
    fn unknown_key_reports_the_line() {
        let file = config_file("color: true\nprompt: $\n");

        let error = Configuration::from_file(file.path()).unwrap_err();

        assert!(matches!(
            error,
            ShellError::State(StateError::FailedToReadConfigFile(_, 2))
        ));
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let file = config_file("show-errors: sometimes\n");
        assert!(Configuration::from_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_rejected() {
        let error = Configuration::from_file(Path::new("/nonexistent/trip.conf")).unwrap_err();
        assert!(matches!(
            error,
            ShellError::State(StateError::FailedToOpenConfigFile(_))
        ));
    }
}
