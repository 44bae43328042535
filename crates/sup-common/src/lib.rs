//! Shared types for the sup supervisor client.
//!
//! This crate provides the foundational types used by both status channels
//! and the command-line surface:
//! - Process listing rows and state codes
//! - Output format specification

pub mod output;
pub mod process;

pub use output::OutputFormat;
pub use process::{state_description, ProcessInfo, ProcessState};
