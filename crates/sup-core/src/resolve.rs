//! Token resolution: indices, ranges, and names → canonical process names.
//!
//! User tokens are resolved against the current listing in input order,
//! duplicates allowed. Numeric tokens outside the listing are accumulated
//! and reported together after the whole token list has been processed.
//! Bare names with no match are NOT errors: they are forwarded tagged as
//! [`ResolvedTarget::Unresolved`] so the eventual control call reports the
//! real failure.

use sup_common::ProcessInfo;
use thiserror::Error;

/// How a user token was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Token was a valid index, or came from a range.
    Indexed(String),
    /// Bare name matched a listed process.
    Named(String),
    /// Token already carried a group qualifier and was passed through.
    Canonical(String),
    /// No match; forwarded as-is.
    Unresolved(String),
}

impl ResolvedTarget {
    /// The canonical process name to hand to the controller.
    pub fn name(&self) -> &str {
        match self {
            ResolvedTarget::Indexed(name)
            | ResolvedTarget::Named(name)
            | ResolvedTarget::Canonical(name)
            | ResolvedTarget::Unresolved(name) => name,
        }
    }
}

/// Resolution failures. Range errors abort immediately; index errors are
/// batched across the whole token list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid range format: {0}")]
    RangeFormat(String),

    #[error("invalid range bounds: {0}")]
    RangeBounds(String),

    #[error("range {token} outside valid interval 1-{max}")]
    RangeInterval { token: String, max: usize },

    #[error("invalid process indices {indices:?} (valid range: 1-{max})")]
    InvalidIndices { indices: Vec<i64>, max: usize },
}

/// Resolve user tokens against the current process listing.
pub fn resolve_targets(
    tokens: &[String],
    processes: &[ProcessInfo],
) -> Result<Vec<ResolvedTarget>, ResolveError> {
    let mut resolved = Vec::with_capacity(tokens.len());
    let mut invalid_indices: Vec<i64> = Vec::new();

    for token in tokens {
        // Any hyphen means range syntax; `my-app` style names cannot be
        // addressed bare and must go through an index or group qualifier.
        if token.contains('-') {
            resolve_range(token, processes, &mut resolved)?;
            continue;
        }

        if let Ok(index) = token.parse::<i64>() {
            if index < 1 || index as usize > processes.len() {
                invalid_indices.push(index);
            } else {
                resolved.push(ResolvedTarget::Indexed(
                    processes[index as usize - 1].name.clone(),
                ));
            }
            continue;
        }

        if token.contains(':') {
            resolved.push(ResolvedTarget::Canonical(token.clone()));
            continue;
        }

        match find_by_name(token, processes) {
            Some(name) => resolved.push(ResolvedTarget::Named(name)),
            None => resolved.push(ResolvedTarget::Unresolved(token.clone())),
        }
    }

    if !invalid_indices.is_empty() {
        return Err(ResolveError::InvalidIndices {
            indices: invalid_indices,
            max: processes.len(),
        });
    }
    Ok(resolved)
}

fn resolve_range(
    token: &str,
    processes: &[ProcessInfo],
    resolved: &mut Vec<ResolvedTarget>,
) -> Result<(), ResolveError> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() != 2 {
        return Err(ResolveError::RangeFormat(token.to_string()));
    }
    let (Ok(start), Ok(end)) = (parts[0].parse::<usize>(), parts[1].parse::<usize>()) else {
        return Err(ResolveError::RangeBounds(token.to_string()));
    };
    if start < 1 || end > processes.len() || start > end {
        return Err(ResolveError::RangeInterval {
            token: token.to_string(),
            max: processes.len(),
        });
    }
    for i in start..=end {
        resolved.push(ResolvedTarget::Indexed(processes[i - 1].name.clone()));
    }
    Ok(())
}

/// First process whose full name, or name part after the group qualifier,
/// equals the token.
fn find_by_name(token: &str, processes: &[ProcessInfo]) -> Option<String> {
    processes.iter().find_map(|proc| {
        let after_group = proc.name.split_once(':').map(|(_, n)| n);
        (proc.name == token || after_group == Some(token)).then(|| proc.name.clone())
    })
}
