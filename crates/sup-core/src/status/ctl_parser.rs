//! Parser for the companion tool's plain-text status listing.
//!
//! `supervisorctl status` output is line-oriented but loosely formatted:
//!
//! ```text
//! agent:agent_00                   RUNNING   pid 988995, uptime 30 days, 16:17:38
//! agent:agent_02                   STOPPED   Not started
//! web:web_01                       FATAL     Exited too quickly (process log may have details)
//! ```
//!
//! Lines that do not look like process rows (warnings, prompts, wrapped
//! continuations) are noise and skipped, never errors.

use regex::Regex;
use std::sync::OnceLock;
use sup_common::{state_description, ProcessInfo, ProcessState};

/// State tokens that mark a line as a process-status row.
const STATE_TOKENS: [&str; 6] = [
    "running", "stopped", "starting", "stopping", "fatal", "backoff",
];

/// Additional keywords that rescue otherwise unrecognized rows.
const LINE_KEYWORDS: [&str; 4] = ["pid", "uptime", "not started", "exited"];

fn hms_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})$").expect("static pattern"))
}

fn ms_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{1,2})$").expect("static pattern"))
}

/// Parse the plain-text status listing into process rows.
///
/// Row order follows input order; indices are assigned 1-based over the
/// rows that survive classification.
pub fn parse_status_output(output: &str) -> Vec<ProcessInfo> {
    let mut processes = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // First whitespace run splits name from the rest; names may embed a
        // group qualifier (`group:name`) and are never split on the colon.
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name.trim(), rest.trim()),
            None => (line, ""),
        };
        if !is_process_line(name, rest) {
            continue;
        }

        let fields: Vec<&str> = rest.split_whitespace().collect();
        let Some(state_name) = fields.first() else {
            continue;
        };

        let state = ProcessState::code_from_name(state_name);
        let pid = find_pid(&fields);
        let mut uptime = find_uptime(&fields);
        if uptime.is_empty() && !state_name.to_ascii_uppercase().contains("RUNNING") {
            uptime = trailing_detail(&fields);
        }

        processes.push(ProcessInfo {
            index: processes.len() + 1,
            name: name.to_string(),
            group: name.split_once(':').map(|(g, _)| g).unwrap_or("").to_string(),
            state,
            state_name: state_name.to_string(),
            pid,
            uptime,
            description: state_description(state).to_string(),
        });
    }

    processes
}

/// Whether a line looks like a process-status row.
fn is_process_line(name: &str, rest: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let lowered = rest.to_lowercase();
    STATE_TOKENS.iter().any(|t| lowered.contains(t))
        || LINE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// PID following a `pid` token, trailing comma stripped; 0 when absent or
/// unparseable.
fn find_pid(fields: &[&str]) -> u32 {
    for (i, field) in fields.iter().enumerate() {
        if *field == "pid" {
            if let Some(raw) = fields.get(i + 1) {
                return raw.trim_end_matches(',').parse().unwrap_or(0);
            }
        }
    }
    0
}

/// Extract and reformat the duration following the `uptime` keyword.
///
/// Recognizes `N days, H:MM:SS` as a days prefix plus time token; otherwise
/// only the single following token is considered.
fn find_uptime(fields: &[&str]) -> String {
    let Some(pos) = fields.iter().position(|f| *f == "uptime") else {
        return String::new();
    };
    let Some(first) = fields.get(pos + 1) else {
        return String::new();
    };
    let first = first.trim_end_matches(',');

    if let Ok(days) = first.parse::<u64>() {
        let unit = fields
            .get(pos + 2)
            .map(|f| f.trim_end_matches(',').to_ascii_lowercase());
        if matches!(unit.as_deref(), Some("day") | Some("days")) {
            return match fields.get(pos + 3) {
                Some(time) => format!("{days} days, {}", format_duration(time.trim_end_matches(','))),
                None => format!("{days} days"),
            };
        }
    }

    format_duration(first)
}

/// Reformat `H:MM:SS` and `MM:SS` tokens into a spelled-out duration;
/// anything else is returned verbatim.
fn format_duration(token: &str) -> String {
    if let Some(caps) = hms_pattern().captures(token) {
        let hours: u64 = caps[1].parse().unwrap_or(0);
        let minutes: u64 = caps[2].parse().unwrap_or(0);
        let seconds: u64 = caps[3].parse().unwrap_or(0);
        return if hours > 0 {
            format!("{hours} hours {minutes:02} minutes {seconds:02} seconds")
        } else {
            format!("{minutes:02} minutes {seconds:02} seconds")
        };
    }
    if let Some(caps) = ms_pattern().captures(token) {
        let minutes: u64 = caps[1].parse().unwrap_or(0);
        let seconds: u64 = caps[2].parse().unwrap_or(0);
        return format!("{minutes:02} minutes {seconds:02} seconds");
    }
    token.to_string()
}

/// Descriptive text after the state token, with the `pid <n>` pair removed.
///
/// Covers rows like `STOPPED Not started` and `FATAL Exited too quickly`.
fn trailing_detail(fields: &[&str]) -> String {
    let mut parts = Vec::new();
    let mut skip_next = false;
    for field in &fields[1..] {
        if skip_next {
            skip_next = false;
            continue;
        }
        if *field == "pid" {
            skip_next = true;
            continue;
        }
        parts.push(*field);
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_BLOCK: &str = "\
agent:agent_00                   RUNNING   pid 988995, uptime 30 days, 16:17:38
agent:agent_01                   RUNNING   pid 988996, uptime 30 days, 16:17:38
agent:agent_02                   STOPPED   Not started
web:web_00                       STARTING
web:web_01                       FATAL     Exited too quickly (process log may have details)
database:db_00                   BACKOFF   Exited too quickly (process log may have details)";

    #[test]
    fn parses_full_status_block() {
        let processes = parse_status_output(STATUS_BLOCK);
        assert_eq!(processes.len(), 6);

        let agent = &processes[0];
        assert_eq!(agent.index, 1);
        assert_eq!(agent.name, "agent:agent_00");
        assert_eq!(agent.group, "agent");
        assert_eq!(agent.state_name, "RUNNING");
        assert_eq!(agent.state, 20);
        assert_eq!(agent.pid, 988995);
        assert_eq!(agent.uptime, "30 days, 16 hours 17 minutes 38 seconds");
        assert_eq!(agent.description, "up and running");

        let stopped = &processes[2];
        assert_eq!(stopped.state_name, "STOPPED");
        assert_eq!(stopped.state, 0);
        assert_eq!(stopped.pid, 0);
        assert_eq!(stopped.uptime, "Not started");
        assert_eq!(stopped.description, "not running");

        let starting = &processes[3];
        assert_eq!(starting.name, "web:web_00");
        assert_eq!(starting.state, 10);
        assert_eq!(starting.description, "starting up");

        let fatal = &processes[4];
        assert_eq!(fatal.state, 100);
        assert_eq!(
            fatal.uptime,
            "Exited too quickly (process log may have details)"
        );

        let backoff = &processes[5];
        assert_eq!(backoff.state, 200);
        assert_eq!(backoff.description, "retrying after exit");
    }

    #[test]
    fn noise_lines_are_dropped_and_indices_stay_sequential() {
        let output = "\
nginx                          RUNNING   pid 1234, uptime 1:02:03
invalid line without proper format
redis                          RUNNING   pid 5678, uptime 2:03:04

another invalid line";
        let processes = parse_status_output(output);
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].name, "nginx");
        assert_eq!(processes[0].index, 1);
        assert_eq!(processes[1].name, "redis");
        assert_eq!(processes[1].index, 2);
    }

    #[test]
    fn empty_and_whitespace_input_yield_empty_listing() {
        assert!(parse_status_output("").is_empty());
        assert!(parse_status_output("\n\n\n").is_empty());
        assert!(parse_status_output("   \n  \n \t \n").is_empty());
    }

    #[test]
    fn single_token_line_is_dropped() {
        assert!(parse_status_output("orphan").is_empty());
    }

    #[test]
    fn hour_component_is_omitted_when_zero() {
        let processes = parse_status_output("web  RUNNING  pid 10, uptime 0:05:09");
        assert_eq!(processes[0].uptime, "05 minutes 09 seconds");
    }

    #[test]
    fn minute_second_token_is_formatted() {
        let processes = parse_status_output("web  RUNNING  pid 10, uptime 59:48");
        assert_eq!(processes[0].uptime, "59 minutes 48 seconds");
    }

    #[test]
    fn unrecognized_duration_tokens_are_kept_verbatim() {
        let processes = parse_status_output("web  RUNNING  pid 10, uptime 1h");
        assert_eq!(processes[0].uptime, "1h");
    }

    #[test]
    fn unparseable_pid_stays_zero() {
        let processes = parse_status_output("web  RUNNING  pid oops, uptime 1:02:03");
        assert_eq!(processes[0].pid, 0);
    }

    #[test]
    fn ungrouped_name_has_empty_group() {
        let processes = parse_status_output("nginx  RUNNING  pid 1, uptime 0:01:00");
        assert_eq!(processes[0].group, "");
    }

    #[test]
    fn unknown_state_token_maps_to_stopped_code() {
        // "exited" rescues the row; the state token itself is unknown.
        let processes = parse_status_output("job  EXITED  exited at 10:01");
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].state, 0);
        assert_eq!(processes[0].state_name, "EXITED");
    }
}
