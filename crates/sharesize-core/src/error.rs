//! Error types for remote fetches and traversal.

use std::time::Duration;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single page fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server asked us to slow down (HTTP 429/503).
    #[error("Throttled by server")]
    Throttled {
        /// Server-suggested wait, if it sent one.
        retry_after: Option<Duration>,
    },

    /// Network failure or server error that may succeed on retry.
    #[error("Transient failure: {message}")]
    Transient { message: String },

    /// Credentials rejected or access denied.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The requested path does not exist.
    #[error("Not found: {path}")]
    NotFound { path: CompactString },

    /// The server answered with something we could not decode.
    #[error("Malformed response: {message}")]
    Malformed { message: String },
}

impl FetchError {
    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Throttled { .. } | FetchError::Transient { .. })
    }

    /// Server-suggested wait before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::Throttled { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// A remote operation kept failing and was given up on.
#[derive(Debug, Clone, Error)]
#[error("Remote unavailable after {attempts} attempt(s): {source}")]
pub struct RemoteUnavailable {
    /// Number of attempts made.
    pub attempts: u32,
    /// Last error seen.
    #[source]
    pub source: FetchError,
}

/// Fatal errors that abort a whole traversal.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// Listing the root folder failed.
    #[error("Root folder unreachable: {path}: {source}")]
    RootUnreachable {
        path: CompactString,
        #[source]
        source: RemoteUnavailable,
    },

    /// The traversal was cancelled before it completed.
    #[error("Traversal interrupted")]
    Interrupted,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Kind of traversal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Retries were exhausted on a retryable failure.
    RemoteUnavailable,
    /// The server refused the request outright (not found, access denied, ...).
    Rejected,
}

/// Non-fatal warning recorded for a folder whose listing did not complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalWarning {
    /// Folder where the warning occurred.
    pub path: CompactString,
    /// Human-readable reason.
    pub reason: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl TraversalWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<CompactString>, reason: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
            kind,
        }
    }

    /// Create a warning from a failed listing.
    pub fn from_failure(path: impl Into<CompactString>, failure: &RemoteUnavailable) -> Self {
        let kind = if failure.source.is_retryable() {
            WarningKind::RemoteUnavailable
        } else {
            WarningKind::Rejected
        };
        Self::new(path, failure.to_string(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::Throttled { retry_after: None }.is_retryable());
        assert!(FetchError::transient("reset").is_retryable());
        assert!(!FetchError::NotFound { path: "x".into() }.is_retryable());
        assert!(
            !FetchError::Unauthorized {
                message: "denied".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_warning_from_failure() {
        let failure = RemoteUnavailable {
            attempts: 4,
            source: FetchError::transient("connection reset"),
        };
        let warning = TraversalWarning::from_failure("A/B", &failure);
        assert_eq!(warning.kind, WarningKind::RemoteUnavailable);
        assert!(warning.reason.contains("4 attempt"));

        let rejected = RemoteUnavailable {
            attempts: 1,
            source: FetchError::NotFound { path: "A/C".into() },
        };
        let warning = TraversalWarning::from_failure("A/C", &rejected);
        assert_eq!(warning.kind, WarningKind::Rejected);
    }
}
