//! Validated start/stop/restart execution against the companion tool.
//!
//! The process name is validated BEFORE any external command is constructed:
//! shell and tool metacharacters are rejected outright, and everything else
//! must stay inside the supervisor name alphabet (alphanumeric, `:`, `_`,
//! `-`, `.`). Commands are spawned with an explicit argument vector, never a
//! shell string.

use crate::exec::{CommandRunner, ExecError, SystemRunner, CTL_PROGRAM};
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Characters rejected outright in a process name.
const BANNED_CHARS: &[char] = &[
    '|', ';', '&', '`', '$', '(', ')', '<', '>', '[', ']', '{', '}', '\\', '"', '\'',
];

/// A supported control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
}

impl Action {
    /// The keyword passed to the companion tool.
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
        }
    }
}

impl FromStr for Action {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Action::Start),
            "stop" => Ok(Action::Stop),
            "restart" => Ok(Action::Restart),
            _ => Err(ControlError::UnsupportedAction(s.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Controller failures.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("process name contains illegal characters")]
    IllegalName,

    #[error("failed to run {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: ExecError,
    },

    /// The tool ran but reported failure; the raw output is kept for
    /// diagnostics.
    #[error("{action} {name} failed: {output}")]
    ActionFailed {
        action: Action,
        name: String,
        output: String,
    },

    /// The stop half of a restart failed; start was never attempted.
    #[error("stopping {name} failed: {source}")]
    RestartStopFailed {
        name: String,
        #[source]
        source: Box<ControlError>,
    },
}

/// Controller tuning knobs.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Companion tool binary.
    pub ctl_program: String,
    /// Pause between the stop and start halves of a restart.
    pub restart_pause: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            ctl_program: CTL_PROGRAM.to_string(),
            restart_pause: Duration::from_secs(1),
        }
    }
}

/// Executes validated control actions through a [`CommandRunner`].
#[derive(Debug)]
pub struct Controller<R = SystemRunner> {
    runner: R,
    config: ControlConfig,
}

impl Controller<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner, ControlConfig::default())
    }
}

impl Default for Controller<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Controller<R> {
    pub fn with_runner(runner: R, config: ControlConfig) -> Self {
        Self { runner, config }
    }

    /// The underlying runner (exposed for callers that stub execution).
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one action against one canonical process name.
    pub fn control(&self, action: Action, name: &str) -> Result<(), ControlError> {
        validate_process_name(name)?;
        match action {
            Action::Restart => {
                self.run_single(Action::Stop, name).map_err(|source| {
                    ControlError::RestartStopFailed {
                        name: name.to_string(),
                        source: Box::new(source),
                    }
                })?;
                thread::sleep(self.config.restart_pause);
                self.run_single(Action::Start, name)
            }
            single => self.run_single(single, name),
        }
    }

    fn run_single(&self, action: Action, name: &str) -> Result<(), ControlError> {
        debug!(%action, name, "invoking control command");
        let output = self
            .runner
            .combined_output(&self.config.ctl_program, &[action.keyword(), name])
            .map_err(|source| ControlError::Exec {
                program: self.config.ctl_program.clone(),
                source,
            })?;

        // supervisorctl reports per-process failures on stdout with a zero
        // exit, e.g. "nginx: ERROR (no such process)".
        if !output.success || output.text.contains("ERROR") {
            return Err(ControlError::ActionFailed {
                action,
                name: name.to_string(),
                output: output.text,
            });
        }
        Ok(())
    }
}

/// Reject names that could smuggle shell or tool metacharacters.
pub fn validate_process_name(name: &str) -> Result<(), ControlError> {
    if name.contains(BANNED_CHARS) {
        return Err(ControlError::IllegalName);
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-' | '.');
    if !name.chars().all(allowed) {
        return Err(ControlError::IllegalName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use std::cell::RefCell;

    /// Records every invocation; fails actions listed in `fail_actions`.
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail_actions: Vec<&'static str>,
    }

    impl CommandRunner for RecordingRunner {
        fn combined_output(
            &self,
            program: &str,
            args: &[&str],
        ) -> Result<CommandOutput, ExecError> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            self.calls.borrow_mut().push(call);

            if self.fail_actions.contains(&args[0]) {
                return Ok(CommandOutput {
                    success: true,
                    text: format!("{}: ERROR (no such process)", args[1]),
                });
            }
            Ok(CommandOutput {
                success: true,
                text: format!("{}: {}ed", args[1], args[0]),
            })
        }
    }

    fn controller(runner: RecordingRunner) -> Controller<RecordingRunner> {
        Controller::with_runner(
            runner,
            ControlConfig {
                restart_pause: Duration::ZERO,
                ..ControlConfig::default()
            },
        )
    }

    #[test]
    fn valid_names_are_accepted() {
        for name in ["nginx", "web:web_00", "my-app.worker", "a_b-c.d:e2"] {
            assert!(validate_process_name(name).is_ok(), "name: {name}");
        }
    }

    #[test]
    fn metacharacters_are_rejected() {
        for name in [
            "nginx; rm -rf /",
            "a|b",
            "a&b",
            "a`b`",
            "$(reboot)",
            "a<b",
            "a>b",
            "a[b]",
            "a{b}",
            "a\\b",
            "a\"b",
            "a'b",
            "name with spaces",
            "tab\tname",
            "naïve",
        ] {
            assert!(
                matches!(validate_process_name(name), Err(ControlError::IllegalName)),
                "name: {name}"
            );
        }
    }

    #[test]
    fn injection_attempt_never_reaches_the_runner() {
        let ctl = controller(RecordingRunner::default());
        let err = ctl.control(Action::Start, "nginx; rm -rf /").unwrap_err();
        assert!(matches!(err, ControlError::IllegalName));
        assert!(ctl.runner.calls.borrow().is_empty());
    }

    #[test]
    fn start_invokes_explicit_argv() {
        let ctl = controller(RecordingRunner::default());
        ctl.control(Action::Start, "web:web_00").unwrap();
        assert_eq!(
            *ctl.runner.calls.borrow(),
            vec![vec![
                "supervisorctl".to_string(),
                "start".to_string(),
                "web:web_00".to_string()
            ]]
        );
    }

    #[test]
    fn error_in_output_fails_even_on_zero_exit() {
        let ctl = controller(RecordingRunner {
            fail_actions: vec!["start"],
            ..RecordingRunner::default()
        });
        let err = ctl.control(Action::Start, "ghost").unwrap_err();
        let ControlError::ActionFailed {
            action,
            name,
            output,
        } = err
        else {
            panic!("expected ActionFailed");
        };
        assert_eq!(action, Action::Start);
        assert_eq!(name, "ghost");
        assert!(output.contains("ERROR"));
    }

    #[test]
    fn restart_runs_stop_then_start() {
        let ctl = controller(RecordingRunner::default());
        ctl.control(Action::Restart, "worker").unwrap();
        let calls = ctl.runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][1], "stop");
        assert_eq!(calls[1][1], "start");
    }

    #[test]
    fn restart_aborts_when_stop_fails() {
        let ctl = controller(RecordingRunner {
            fail_actions: vec!["stop"],
            ..RecordingRunner::default()
        });
        let err = ctl.control(Action::Restart, "worker").unwrap_err();
        assert!(matches!(err, ControlError::RestartStopFailed { .. }));
        let calls = ctl.runner.calls.borrow();
        assert_eq!(calls.len(), 1, "start must never run after a failed stop");
        assert_eq!(calls[0][1], "stop");
    }

    #[test]
    fn unsupported_action_strings_fail_to_parse() {
        let err = "reload".parse::<Action>().unwrap_err();
        assert!(matches!(err, ControlError::UnsupportedAction(a) if a == "reload"));
        assert_eq!("start".parse::<Action>().unwrap(), Action::Start);
        assert_eq!("restart".parse::<Action>().unwrap(), Action::Restart);
    }
}
