//! Connection settings for the daemon's RPC endpoint.
//!
//! Resolution order: CLI arguments → environment variables → defaults. The
//! environment names match what the daemon's own tooling conventionally
//! uses, so one shell profile configures both.

use serde::{Deserialize, Serialize};

/// Default RPC endpoint when nothing is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9001/RPC2";

/// Environment variable naming the endpoint URL.
pub const ENV_ENDPOINT: &str = "SUPERVISOR_HOST";
/// Environment variable naming the basic-auth username.
pub const ENV_USERNAME: &str = "SUPERVISOR_USER";
/// Environment variable naming the basic-auth password.
pub const ENV_PASSWORD: &str = "SUPERVISOR_PASSWORD";

/// Connection settings for the RPC channel.
///
/// Auth is sent only when both credentials are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Full endpoint URL, e.g. `http://localhost:9001/RPC2`.
    pub endpoint: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary lookup; keeps tests off the global
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            config.endpoint = endpoint;
        }
        if let Some(username) = lookup(ENV_USERNAME).filter(|v| !v.is_empty()) {
            config.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD).filter(|v| !v.is_empty()) {
            config.password = password;
        }
        config
    }
}
