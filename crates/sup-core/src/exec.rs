//! Command execution seam for the companion command-line tool.
//!
//! Both the textual status channel and the process controller shell out to
//! `supervisorctl`. Routing every invocation through [`CommandRunner`] keeps
//! the call sites testable with recording stubs, and guarantees an explicit
//! argument vector on every path (nothing here ever goes through a shell).

use std::process::Command;
use thiserror::Error;

/// The companion command-line tool driven by the fallback channel and the
/// controller.
pub const CTL_PROGRAM: &str = "supervisorctl";

/// Errors spawning or collecting an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured outcome of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited successfully.
    pub success: bool,
    /// Combined stdout then stderr, lossily decoded.
    pub text: String,
}

/// Executes an external command with an explicit argument vector.
pub trait CommandRunner {
    fn combined_output(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError>;
}

/// Runner backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn combined_output(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        let output = Command::new(program).args(args).output().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExecError::NotFound(program.to_string())
            } else {
                ExecError::Spawn {
                    program: program.to_string(),
                    source,
                }
            }
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            success: output.status.success(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_reports_not_found() {
        let err = SystemRunner
            .combined_output("sup-test-no-such-binary", &["status"])
            .unwrap_err();
        assert!(matches!(err, ExecError::NotFound(name) if name == "sup-test-no-such-binary"));
    }
}
