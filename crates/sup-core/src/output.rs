//! Rendering of the process listing for humans and machines.

use sup_common::ProcessInfo;

const RESET: &str = "\x1b[0m";

/// ANSI color for a state code.
fn state_color(state: i64) -> &'static str {
    match state {
        20 => "\x1b[32m",      // RUNNING
        10 | 30 => "\x1b[33m", // STARTING / STOPPING
        100 => "\x1b[31m",     // FATAL
        _ => "\x1b[37m",
    }
}

/// Render the listing as an aligned text table.
pub fn render_table(processes: &[ProcessInfo], color: bool) -> String {
    if processes.is_empty() {
        return "no processes found\n".to_string();
    }

    let name_width = processes
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let uptime_width = processes
        .iter()
        .map(|p| p.uptime.len())
        .max()
        .unwrap_or(0)
        .max("UPTIME".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<name_width$} {:<10} {:<8} {:<uptime_width$} {}\n",
        "#", "NAME", "STATE", "PID", "UPTIME", "INFO"
    ));
    out.push_str(&"-".repeat(4 + 1 + name_width + 1 + 10 + 1 + 8 + 1 + uptime_width + 1 + 20));
    out.push('\n');

    for p in processes {
        let pid = if p.pid == 0 {
            "-".to_string()
        } else {
            p.pid.to_string()
        };
        let mut state_cell = format!("{:<10}", p.state_name);
        if color {
            state_cell = format!("{}{}{}", state_color(p.state), state_cell, RESET);
        }
        out.push_str(&format!(
            "{:<4} {:<name_width$} {} {:<8} {:<uptime_width$} {}\n",
            p.index, p.name, state_cell, pid, p.uptime, p.description
        ));
    }
    out
}

/// Render the listing as pretty-printed JSON.
pub fn render_json(processes: &[ProcessInfo]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(processes)
}
