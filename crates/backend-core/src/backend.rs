//! Top-level backend contract

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BackendResult;
use crate::session::{MediaPublisher, MediaSession};
use crate::types::{ElementId, PublisherOptions, ScreenShareCapability, SessionId};

/// Entry point into a concrete streaming SDK binding
///
/// The binding owns its own credentials (API keys and the like); the session
/// coordination layer only ever hands it service-issued session ids. All
/// three operations are factories or probes — nothing here mutates session
/// state, that happens through the returned handles.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Probe whether this environment can capture the screen
    async fn screen_share_capability(&self) -> BackendResult<ScreenShareCapability>;

    /// Create a handle to a session, not yet connected
    async fn init_session(&self, session_id: &SessionId) -> BackendResult<Arc<dyn MediaSession>>;

    /// Create a publisher bound to a host-UI element
    ///
    /// The publisher starts capturing but is not sent anywhere until it is
    /// passed to [`MediaSession::publish`].
    async fn init_publisher(
        &self,
        target: &ElementId,
        options: PublisherOptions,
    ) -> BackendResult<Arc<dyn MediaPublisher>>;
}
