//! Error types for capacity provider calls.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while talking to the capacity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider url: {0}")]
    InvalidUrl(String),

    /// Connection-level failure that persisted through every retry.
    #[error("provider unreachable after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// The provider answered with a non-2xx status. Never retried.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether the failure happened below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport { .. })
    }
}
