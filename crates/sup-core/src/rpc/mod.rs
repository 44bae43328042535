//! XML-RPC channel: wire codec and blocking HTTP transport.

pub mod client;
pub mod value;

pub use client::{RpcClient, RpcError};
pub use value::WireValue;
