//! Blocking XML-RPC transport for the supervision daemon.
//!
//! One HTTP POST per call, with a fixed timeout and redirects disabled so a
//! misconfigured or hostile endpoint cannot bounce the request elsewhere.
//! Every failure mode gets its own [`RpcError`] variant; the status façade
//! treats all of them the same way (fall back to the textual channel), but
//! diagnostics need to tell them apart.

use crate::config::ConnectionConfig;
use crate::rpc::value::{decode_method_response, encode_method_call, CodecError, WireValue};
use std::time::Duration;
use sup_common::{state_description, ProcessInfo};
use thiserror::Error;
use tracing::trace;

/// Fixed transport timeout for every RPC call.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Method returning the full process listing.
const METHOD_ALL_PROCESS_INFO: &str = "supervisor.getAllProcessInfo";

/// Errors from one RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection-level failure before a status code arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("http status {code}: {body}")]
    Status { code: u16, body: String },

    /// The body was not a decodable method response.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The daemon reported a structured fault.
    #[error("daemon fault: {0}")]
    Fault(String),

    /// The response decoded, but is not shaped like the caller expects.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(&'static str),
}

/// Client for the daemon's XML-RPC endpoint.
pub struct RpcClient {
    endpoint: String,
    username: String,
    password: String,
    http: reqwest::blocking::Client,
}

impl RpcClient {
    pub fn new(config: &ConnectionConfig) -> Result<Self, RpcError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(RPC_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("sup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            http,
        })
    }

    /// Perform one RPC call. `Ok(None)` means the response carried no value.
    pub fn call(&self, method: &str, params: &[WireValue]) -> Result<Option<WireValue>, RpcError> {
        let body = encode_method_call(method, params);
        trace!(method, endpoint = %self.endpoint, "sending rpc request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body);
        if !self.username.is_empty() && !self.password.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(RpcError::Status {
                code: status.as_u16(),
                body: text,
            });
        }

        match decode_method_response(&text) {
            Ok(value) => Ok(value),
            Err(CodecError::Fault(message)) => Err(RpcError::Fault(message)),
            Err(CodecError::Malformed(err)) => Err(RpcError::Decode(err.to_string())),
        }
    }

    /// Fetch the full process listing.
    ///
    /// A decoded response that is not an array of structs is an error so the
    /// façade can fall back instead of reporting an empty listing.
    pub fn all_process_info(&self) -> Result<Vec<ProcessInfo>, RpcError> {
        let value = self
            .call(METHOD_ALL_PROCESS_INFO, &[])?
            .ok_or(RpcError::UnexpectedShape("empty response"))?;
        let rows = value
            .as_array()
            .ok_or(RpcError::UnexpectedShape("expected an array of process structs"))?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| process_from_struct(row, i + 1))
            .collect())
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Build a [`ProcessInfo`] from one `getAllProcessInfo` struct.
///
/// Missing or mistyped members land on defaults rather than failing the
/// whole listing.
fn process_from_struct(value: &WireValue, index: usize) -> ProcessInfo {
    let text = |name: &str| {
        value
            .member(name)
            .and_then(WireValue::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let number = |name: &str| value.member(name).and_then(WireValue::as_int).unwrap_or(0);

    let name = text("name");
    let group = text("group");
    let state = number("state");
    let state_name = text("statename");
    let pid = number("pid").max(0) as u32;
    let detail = text("description");

    let full_name = if !group.is_empty() && !name.is_empty() {
        format!("{group}:{name}")
    } else {
        name
    };
    // A running process carries its uptime inside the RPC description field
    // ("pid 988995, uptime 30 days, 16:17:38"); stopped ones get a fixed
    // marker.
    let uptime = if pid > 0 {
        detail
    } else {
        "stopped".to_string()
    };

    ProcessInfo {
        index,
        name: full_name,
        group,
        state,
        state_name,
        pid,
        uptime,
        description: state_description(state).to_string(),
    }
}
