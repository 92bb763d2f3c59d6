//! External formatter support
//!
//! Pipes source through a formatter command that reads the program on stdin
//! and writes the formatted program to stdout (`yapf`, `black -q -`).

use std::io::Write;
use std::process::{Command, Stdio};

use pydown_core::logging;
use thiserror::Error;

/// Errors raised while running an external formatter
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter command is empty")]
    EmptyCommand,

    #[error("failed to run formatter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("formatter '{program}' produced invalid UTF-8 output")]
    InvalidOutput { program: String },
}

/// A formatter run as a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    /// Program followed by its arguments
    pub command: Vec<String>,
}

impl ExternalFormatter {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Format `source`, returning the formatter's stdout
    pub fn format(&self, source: &str) -> Result<String, FormatError> {
        let result = self.run(source);
        logging::log_formatter(
            &self.command,
            result.is_ok(),
            result.as_ref().err().map(|e| e.to_string()).as_deref(),
        );
        result
    }

    fn run(&self, source: &str) -> Result<String, FormatError> {
        let (program, args) = self.command.split_first().ok_or(FormatError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a formatter that writes
        // before reading all input cannot block on a full pipe
        let output = std::thread::scope(|scope| {
            if let Some(mut stdin) = child.stdin.take() {
                scope.spawn(move || {
                    let _ = stdin.write_all(source.as_bytes());
                });
            }
            child.wait_with_output()
        })
        .map_err(|source| FormatError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: program.clone(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn formatter(command: &[&str]) -> ExternalFormatter {
        ExternalFormatter::new(command.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_pipes_through_command() {
        let out = formatter(&["cat"]).format("x = 1\n").unwrap();
        assert_eq!(out, "x = 1\n");
    }

    #[test]
    fn test_command_arguments() {
        let out = formatter(&["tr", "a-z", "A-Z"]).format("abc\n").unwrap();
        assert_eq!(out, "ABC\n");
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(
            formatter(&[]).format("x = 1\n"),
            Err(FormatError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_program() {
        let err = formatter(&["pydown-no-such-formatter"]).format("x\n").unwrap_err();
        assert!(matches!(err, FormatError::Spawn { .. }));
        assert!(err.to_string().contains("pydown-no-such-formatter"));
    }

    #[test]
    fn test_non_zero_exit() {
        let err = formatter(&["sh", "-c", "echo bad input >&2; exit 3"])
            .format("x\n")
            .unwrap_err();
        match err {
            FormatError::Failed { stderr, .. } => assert_eq!(stderr, "bad input"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
