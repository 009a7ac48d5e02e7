//! Error types reported by streaming backend implementations

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors a concrete streaming backend can report
///
/// These cover the failure surface of the external SDK: connecting a session,
/// publishing media into it, switching capture devices, and probing
/// capabilities. The session coordination layer converts these into its own
/// error type at the crate boundary.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Session connection failed
    #[error("session connect failed: {message}")]
    Connect { message: String },

    /// Publishing a media source into the session failed
    #[error("publish failed: {message}")]
    Publish { message: String },

    /// A capture device could not be opened or switched
    #[error("device error: {message}")]
    Device { message: String },

    /// The capability probe could not be completed
    #[error("capability probe failed: {message}")]
    Capability { message: String },

    /// The session handle is no longer usable
    #[error("session is closed")]
    SessionClosed,

    /// Internal backend error
    #[error("internal backend error: {message}")]
    Internal { message: String },
}

impl BackendError {
    /// Create a connect error
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a publish error
    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }

    /// Create a device error
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Create a capability probe error
    pub fn capability(message: impl Into<String>) -> Self {
        Self::Capability {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
