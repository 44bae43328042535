//! Process listing rows and state codes.
//!
//! Both status channels (RPC and the textual fallback) produce the same
//! [`ProcessInfo`] shape, so the resolver and controller never need to know
//! which channel answered.

use serde::{Deserialize, Serialize};

/// Supervisor process states.
///
/// The numeric codes mirror the daemon's own state enumeration and are
/// identical across both status channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Fatal,
    Backoff,
}

impl ProcessState {
    /// Numeric state code used on the wire.
    pub fn code(self) -> i64 {
        match self {
            ProcessState::Stopped => 0,
            ProcessState::Starting => 10,
            ProcessState::Running => 20,
            ProcessState::Stopping => 30,
            ProcessState::Fatal => 100,
            ProcessState::Backoff => 200,
        }
    }

    /// Parse a state name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "STOPPED" => Some(ProcessState::Stopped),
            "STARTING" => Some(ProcessState::Starting),
            "RUNNING" => Some(ProcessState::Running),
            "STOPPING" => Some(ProcessState::Stopping),
            "FATAL" => Some(ProcessState::Fatal),
            "BACKOFF" => Some(ProcessState::Backoff),
            _ => None,
        }
    }

    /// Look up a state by its numeric code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ProcessState::Stopped),
            10 => Some(ProcessState::Starting),
            20 => Some(ProcessState::Running),
            30 => Some(ProcessState::Stopping),
            100 => Some(ProcessState::Fatal),
            200 => Some(ProcessState::Backoff),
            _ => None,
        }
    }

    /// Map a textual state name to its numeric code.
    ///
    /// Case-insensitive; unrecognized names map to the STOPPED code.
    pub fn code_from_name(name: &str) -> i64 {
        Self::from_name(name).map(Self::code).unwrap_or(0)
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessState::Stopped => "STOPPED",
            ProcessState::Starting => "STARTING",
            ProcessState::Running => "RUNNING",
            ProcessState::Stopping => "STOPPING",
            ProcessState::Fatal => "FATAL",
            ProcessState::Backoff => "BACKOFF",
        };
        write!(f, "{}", s)
    }
}

/// Fixed human-readable annotation for a state code.
///
/// The RPC channel may report codes outside [`ProcessState`]; those get the
/// unknown annotation.
pub fn state_description(code: i64) -> &'static str {
    match ProcessState::from_code(code) {
        Some(ProcessState::Running) => "up and running",
        Some(ProcessState::Starting) => "starting up",
        Some(ProcessState::Stopping) => "shutting down",
        Some(ProcessState::Stopped) => "not running",
        Some(ProcessState::Fatal) => "failed to start",
        Some(ProcessState::Backoff) => "retrying after exit",
        None => "unknown state",
    }
}

/// One row of the supervisor's process listing.
///
/// Built fresh on every status query and never mutated. `index` is the
/// 1-based position in the listing that produced the row and is not stable
/// across queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// 1-based position in the current listing.
    pub index: usize,
    /// Canonical identifier: `group:name` when grouped, else the bare name.
    pub name: String,
    /// Group as reported by the RPC channel; on the textual channel only
    /// what is embedded in the name.
    pub group: String,
    /// Raw state code as reported; usually one of [`ProcessState`].
    pub state: i64,
    /// Uppercase state token, e.g. `RUNNING`.
    pub state_name: String,
    /// OS pid, 0 when not running.
    pub pid: u32,
    /// Free-form uptime or status detail text.
    pub uptime: String,
    /// Fixed annotation derived from `state`.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_name_mapping_is_case_insensitive() {
        for name in ["running", "Running", "RUNNING", "rUnNiNg"] {
            assert_eq!(ProcessState::code_from_name(name), 20, "name: {name}");
        }
        assert_eq!(ProcessState::code_from_name("starting"), 10);
        assert_eq!(ProcessState::code_from_name("STOPPING"), 30);
        assert_eq!(ProcessState::code_from_name("stopped"), 0);
        assert_eq!(ProcessState::code_from_name("FATAL"), 100);
        assert_eq!(ProcessState::code_from_name("backoff"), 200);
    }

    #[test]
    fn unrecognized_state_names_map_to_stopped_code() {
        assert_eq!(ProcessState::code_from_name("UNKNOWN"), 0);
        assert_eq!(ProcessState::code_from_name(""), 0);
        assert_eq!(ProcessState::code_from_name("EXITED?"), 0);
    }

    #[test]
    fn codes_round_trip_through_from_code() {
        for state in [
            ProcessState::Stopped,
            ProcessState::Starting,
            ProcessState::Running,
            ProcessState::Stopping,
            ProcessState::Fatal,
            ProcessState::Backoff,
        ] {
            assert_eq!(ProcessState::from_code(state.code()), Some(state));
        }
        assert_eq!(ProcessState::from_code(999), None);
    }

    #[test]
    fn descriptions_cover_unknown_codes() {
        assert_eq!(state_description(20), "up and running");
        assert_eq!(state_description(0), "not running");
        assert_eq!(state_description(999), "unknown state");
    }
}
