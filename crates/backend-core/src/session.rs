//! Session and publisher contracts
//!
//! These traits are the shape of the external streaming SDK as the session
//! coordination layer sees it. A concrete binding wraps whatever callback or
//! promise API the vendor ships and exposes each interaction as a single
//! awaitable operation with a typed result; events fan out over broadcast
//! channels so any number of observers can subscribe without the binding
//! knowing who they are.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::BackendResult;
use crate::types::{
    ConnectionInfo, DeviceId, PublisherId, SessionId, StreamDestroyedReason, StreamInfo,
};

/// Asynchronous events delivered by a live session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A remote participant started publishing a stream
    StreamCreated(StreamInfo),
    /// A remote participant's stream went away
    StreamDestroyed(StreamInfo),
    /// A remote participant joined the session
    ConnectionCreated(ConnectionInfo),
    /// A remote participant left the session
    ConnectionDestroyed(ConnectionInfo),
    /// The local connection to the session was established
    Connected,
    /// The local connection to the session ended
    Disconnected {
        /// Reason reported by the service, if any
        reason: Option<String>,
    },
}

/// Asynchronous events delivered by a local publisher
#[derive(Debug, Clone)]
pub enum PublisherEvent {
    /// The publisher's stream stopped
    StreamDestroyed {
        /// Why the stream stopped
        reason: StreamDestroyedReason,
    },
}

/// A handle to one media session on the streaming service
///
/// Obtained from [`MediaBackend::init_session`](crate::MediaBackend::init_session);
/// not yet connected until [`connect`](MediaSession::connect) succeeds.
/// Subscribing before connecting is allowed and is how callers avoid losing
/// events raised during connection establishment.
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// The session this handle belongs to
    fn id(&self) -> &SessionId;

    /// Connect to the session using a service-issued token
    async fn connect(&self, token: &str) -> BackendResult<()>;

    /// Publish a local media source into the session
    async fn publish(&self, publisher: Arc<dyn MediaPublisher>) -> BackendResult<()>;

    /// Remove a previously published source from the session
    async fn unpublish(&self, publisher: Arc<dyn MediaPublisher>) -> BackendResult<()>;

    /// Disconnect from the session
    async fn disconnect(&self) -> BackendResult<()>;

    /// Subscribe to the session's event stream
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// A local media source (camera or screen) that can be sent into a session
#[async_trait]
pub trait MediaPublisher: Send + Sync {
    /// Locally minted id of this publisher
    fn id(&self) -> &PublisherId;

    /// Release the publisher and its capture resources
    async fn destroy(&self) -> BackendResult<()>;

    /// Switch the audio capture to another microphone
    async fn set_audio_source(&self, device: &DeviceId) -> BackendResult<()>;

    /// Switch the video capture to another camera
    async fn set_video_source(&self, device: &DeviceId) -> BackendResult<()>;

    /// Enable or disable the audio track without recreating the publisher
    async fn set_audio_enabled(&self, enabled: bool) -> BackendResult<()>;

    /// Enable or disable the video track without recreating the publisher
    async fn set_video_enabled(&self, enabled: bool) -> BackendResult<()>;

    /// Subscribe to the publisher's event stream
    fn subscribe(&self) -> broadcast::Receiver<PublisherEvent>;
}
