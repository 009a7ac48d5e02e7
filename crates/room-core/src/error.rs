//! Error types for the room session coordination layer

use thiserror::Error;

use crate::state::RoomStateKind;
use colloq_backend_core::BackendError;

/// Result type for room session operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Errors that can occur while coordinating a room's media session
///
/// Failures are always local to the operation that triggered them: the
/// manager either completes a state transition or restores a well-defined
/// prior state before one of these propagates. Nothing is retried
/// internally — retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum RoomError {
    /// An operation was invoked while the state machine was in the wrong variant
    #[error("invalid state transition: {operation} requires {required} state, but state is {actual}")]
    InvalidTransition {
        /// The operation that was attempted
        operation: &'static str,
        /// The state variant the operation requires
        required: &'static str,
        /// The state variant that was actually active
        actual: RoomStateKind,
    },

    /// A screen publisher already exists
    #[error("screen is already published")]
    ScreenAlreadyPublished,

    /// No screen publisher exists
    #[error("screen is not published")]
    ScreenNotPublished,

    /// The streaming backend reported a failure
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The token provider could not issue a session token
    #[error("token provider error: {message}")]
    Token {
        /// What went wrong
        message: String,
    },

    /// An external call outlived the configured operation timeout
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout {
        /// The operation that was cut off
        operation: &'static str,
        /// The configured bound in seconds
        seconds: u64,
    },
}

impl RoomError {
    /// Create an invalid-transition error
    pub fn invalid_transition(
        operation: &'static str,
        required: &'static str,
        actual: RoomStateKind,
    ) -> Self {
        Self::InvalidTransition {
            operation,
            required,
            actual,
        }
    }

    /// Create a token provider error
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: &'static str, bound: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            seconds: bound.as_secs(),
        }
    }
}
