//! Logging setup: tracing to stderr, human or JSON lines.
//!
//! stdout stays reserved for command payloads (listings, JSON); all
//! diagnostics go to stderr. Filtering comes from `SUP_LOG` (or `RUST_LOG`),
//! with the CLI verbosity flags supplying the default when neither is set.
//! The façade's channel decision (rpc vs textual fallback) surfaces here as
//! warn/debug events.

use clap::ValueEnum;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SUP_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "json" | "jsonl" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

static INIT: OnceLock<()> = OnceLock::new();

/// Initialize the global subscriber once; later calls are no-ops.
///
/// `verbosity` counts `-v` flags, with negative values meaning quiet.
pub fn init_logging(format: LogFormat, verbosity: i8) {
    INIT.get_or_init(|| {
        let default_level = match verbosity {
            i8::MIN..=-1 => "error",
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        match format {
            LogFormat::Human => builder.init(),
            LogFormat::Json => builder.json().init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("HUMAN".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!("jsonl".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LogFormat::Human, 0);
        init_logging(LogFormat::Json, 3);
    }
}
