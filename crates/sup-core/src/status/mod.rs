//! Dual-channel status acquisition.
//!
//! Every listing query first asks the daemon over RPC. ANY failure on that
//! channel (transport, non-2xx, malformed body, fault, or a response with
//! an unexpected shape) falls back unconditionally to parsing the companion
//! tool's textual output, which is then authoritative with no further
//! fallback. Neither attempt caches anything.
//!
//! The two channels do not have equal fidelity: RPC reports a separate
//! `group` field and exact state codes, while the textual channel infers
//! everything from formatted output. Callers that care can inspect
//! [`StatusReport::channel`].

pub mod ctl_parser;

use crate::exec::{CommandRunner, ExecError, SystemRunner, CTL_PROGRAM};
use crate::rpc::RpcClient;
use sup_common::ProcessInfo;
use thiserror::Error;
use tracing::{debug, warn};

/// Which channel produced a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChannel {
    /// The RPC channel answered.
    Rpc,
    /// The textual fallback was used.
    CtlFallback,
}

/// A process listing together with the channel that supplied it.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub processes: Vec<ProcessInfo>,
    pub channel: StatusChannel,
}

/// Errors after both channels have been exhausted.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to run {program}: {source}")]
    CommandFailed {
        program: String,
        #[source]
        source: ExecError,
    },

    #[error("{program} status failed: {output}")]
    StatusCommand { program: String, output: String },
}

/// Reads the process listing, RPC first, textual channel second.
#[derive(Debug)]
pub struct StatusReader<R = SystemRunner> {
    rpc: RpcClient,
    runner: R,
    ctl_program: String,
}

impl StatusReader<SystemRunner> {
    pub fn new(rpc: RpcClient) -> Self {
        Self::with_runner(rpc, SystemRunner)
    }
}

impl<R: CommandRunner> StatusReader<R> {
    pub fn with_runner(rpc: RpcClient, runner: R) -> Self {
        Self {
            rpc,
            runner,
            ctl_program: CTL_PROGRAM.to_string(),
        }
    }

    /// Fetch the full process listing.
    pub fn all_processes(&self) -> Result<StatusReport, StatusError> {
        match self.rpc.all_process_info() {
            Ok(processes) => {
                debug!(count = processes.len(), "process listing served by rpc channel");
                Ok(StatusReport {
                    processes,
                    channel: StatusChannel::Rpc,
                })
            }
            Err(err) => {
                warn!(error = %err, "rpc channel failed, falling back to textual channel");
                let processes = self.via_command()?;
                debug!(count = processes.len(), "process listing served by textual channel");
                Ok(StatusReport {
                    processes,
                    channel: StatusChannel::CtlFallback,
                })
            }
        }
    }

    fn via_command(&self) -> Result<Vec<ProcessInfo>, StatusError> {
        let output = self
            .runner
            .combined_output(&self.ctl_program, &["status"])
            .map_err(|source| StatusError::CommandFailed {
                program: self.ctl_program.clone(),
                source,
            })?;

        // supervisorctl exits non-zero when any process is down, but the
        // listing itself is still usable; only give up when the output does
        // not look like a listing at all.
        if !output.success
            && !output.text.contains("RUNNING")
            && !output.text.contains("STOPPED")
        {
            return Err(StatusError::StatusCommand {
                program: self.ctl_program.clone(),
                output: output.text,
            });
        }

        Ok(ctl_parser::parse_status_output(&output.text))
    }
}
