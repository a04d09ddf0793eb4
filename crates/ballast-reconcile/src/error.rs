//! Error types for the reconciler.
//!
//! Every failure carries a distinguishable [`ErrorKind`] so front ends can
//! pick a response without matching on messages.

use std::time::Duration;

use ballast_provider::ProviderError;
use thiserror::Error;

/// Result type alias for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Direction of a capacity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Remove,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Add => f.write_str("add"),
            Direction::Remove => f.write_str("remove"),
        }
    }
}

/// Coarse classification of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    ProviderUnavailable,
    ProviderRejected,
    ResourceFailed,
    PollTimeout,
    Cancelled,
    MutationFailed,
}

/// Errors returned by [`Reconciler`](crate::Reconciler) operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Another convergence is running. Never queued or retried.
    #[error("scaling operation already in progress (target capacity {in_flight_target})")]
    Conflict { in_flight_target: u32 },

    #[error("capacity provider unavailable: {0}")]
    ProviderUnavailable(#[source] ProviderError),

    /// The provider answered, but with an error status or an unreadable body.
    #[error("capacity provider rejected the capacity read: {0}")]
    ProviderRejected(#[source] ProviderError),

    #[error("instance of {resource} is in FAILED state")]
    ResourceFailed { resource: String },

    #[error("timed out after {waited:?} waiting for instance to become ACTIVE")]
    PollTimeout { waited: Duration },

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to {direction} {amount} replica(s): {source}")]
    MutationFailed {
        direction: Direction,
        amount: u32,
        #[source]
        source: ProviderError,
    },
}

impl ReconcileError {
    /// Classify a failed capacity read.
    pub(crate) fn from_read(err: ProviderError) -> Self {
        if err.is_transport() {
            ReconcileError::ProviderUnavailable(err)
        } else {
            ReconcileError::ProviderRejected(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Conflict { .. } => ErrorKind::Conflict,
            ReconcileError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            ReconcileError::ProviderRejected(_) => ErrorKind::ProviderRejected,
            ReconcileError::ResourceFailed { .. } => ErrorKind::ResourceFailed,
            ReconcileError::PollTimeout { .. } => ErrorKind::PollTimeout,
            ReconcileError::Cancelled => ErrorKind::Cancelled,
            ReconcileError::MutationFailed { .. } => ErrorKind::MutationFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_failure_names_direction() {
        let err = ReconcileError::MutationFailed {
            direction: Direction::Remove,
            amount: 2,
            source: ProviderError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::MutationFailed);
        assert_eq!(
            err.to_string(),
            "failed to remove 2 replica(s): provider returned 500: boom"
        );
    }

    #[test]
    fn conflict_reports_in_flight_target() {
        let err = ReconcileError::Conflict { in_flight_target: 7 };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("already in progress"));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn provider_error_is_the_source() {
        use std::error::Error as _;

        let err = ReconcileError::ProviderUnavailable(ProviderError::Transport {
            attempts: 4,
            message: "connection refused".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert!(err.source().is_some());
    }

    #[test]
    fn read_errors_split_transport_from_rejection() {
        let unreachable = ReconcileError::from_read(ProviderError::Transport {
            attempts: 4,
            message: "connection refused".to_string(),
        });
        assert_eq!(unreachable.kind(), ErrorKind::ProviderUnavailable);

        let not_found = ReconcileError::from_read(ProviderError::Status {
            status: 404,
            body: "no such resource".to_string(),
        });
        assert_eq!(not_found.kind(), ErrorKind::ProviderRejected);
        assert!(!not_found.to_string().contains("unavailable"));

        let garbled = ReconcileError::from_read(ProviderError::Decode("eof".to_string()));
        assert_eq!(garbled.kind(), ErrorKind::ProviderRejected);
    }
}
