//! Errors raised while loading `folio.toml`.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use super::FieldPath;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed config file")]
    Toml(#[from] toml::de::Error),

    // Display only: a `source` would make anyhow print the list twice
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected setting
#[derive(Debug)]
struct Problem {
    field: FieldPath,
    message: String,
    hint: Option<String>,
}

/// Every rejected setting found by one `validate` pass, reported together.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    problems: Vec<Problem>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.problems.push(Problem {
            field,
            message: message.into(),
            hint: None,
        });
    }

    pub fn error_with_hint(&mut self, field: FieldPath, message: impl Into<String>, hint: impl Into<String>) {
        self.problems.push(Problem {
            field,
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.problems.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.problems.len();
        write!(
            f,
            "{} ({count} problem{})",
            "invalid configuration".red().bold(),
            if count == 1 { "" } else { "s" }
        )?;
        for problem in &self.problems {
            write!(f, "\n  {} {}: {}", "-".red(), problem.field.as_str().cyan(), problem.message)?;
            if let Some(hint) = &problem.hint {
                write!(f, "\n    {} {hint}", "hint:".yellow())?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("folio.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read config file `folio.toml`");
    }

    #[test]
    fn test_diagnostics_render_every_problem() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(FieldPath::new("watch.retry_ms"), "must be greater than 0");
        diag.error_with_hint(
            FieldPath::new("serve.ws_port"),
            "same as serve.port",
            "use a different port",
        );

        let display = ConfigError::Diagnostics(diag.into_result().unwrap_err()).to_string();
        assert!(display.contains("(2 problems)"));
        assert!(display.contains("watch.retry_ms"));
        assert!(display.contains("must be greater than 0"));
        assert!(display.contains("serve.ws_port"));
        assert!(display.contains("use a different port"));
    }

    #[test]
    fn test_empty_diagnostics_into_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }
}
