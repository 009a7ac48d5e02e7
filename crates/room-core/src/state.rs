//! Session state variants
//!
//! The manager's single field of truth is which of these three variants is
//! live. Transitions happen only inside the manager's lock; everything a
//! variant owns (publisher handles, background task handles, rosters) is torn
//! down by whichever transition destroys it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::{RoomError, RoomResult};
use crate::events::RoomEventHandler;
use crate::token::TokenProvider;
use colloq_backend_core::{
    ConnectionId, ConnectionInfo, DeviceId, MediaPublisher, MediaSession, SessionId, StreamId,
    StreamInfo,
};

/// Which state variant a room session manager is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStateKind {
    /// No configuration yet
    Uninitialized,
    /// Configured but not connected
    Initialized,
    /// Live session
    Connected,
}

impl fmt::Display for RoomStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// The session manager's state machine
pub enum RoomState {
    /// Construction-time default; nothing configured
    Uninitialized,
    /// Configured but not connected
    Initialized(InitializedState),
    /// Live session
    Connected(ConnectedState),
}

impl RoomState {
    /// Which variant is live
    pub fn kind(&self) -> RoomStateKind {
        match self {
            Self::Uninitialized => RoomStateKind::Uninitialized,
            Self::Initialized(_) => RoomStateKind::Initialized,
            Self::Connected(_) => RoomStateKind::Connected,
        }
    }

    /// Borrow the connected state, or report an invalid transition
    pub fn connected_mut(&mut self, operation: &'static str) -> RoomResult<&mut ConnectedState> {
        match self {
            Self::Connected(connected) => Ok(connected),
            other => Err(RoomError::invalid_transition(
                operation,
                "connected",
                other.kind(),
            )),
        }
    }

    /// The registered event handler, whichever configured variant holds it
    pub fn handler(&self) -> Option<Arc<dyn RoomEventHandler>> {
        match self {
            Self::Uninitialized => None,
            Self::Initialized(init) => Some(init.handler.clone()),
            Self::Connected(connected) => Some(connected.initialized.handler.clone()),
        }
    }
}

/// Configuration stored by `initialize`, retained verbatim across a
/// connect/disconnect cycle
#[derive(Clone)]
pub struct InitializedState {
    /// Issues connection tokens at connect time
    pub token_provider: Arc<dyn TokenProvider>,
    /// The session this manager is configured for
    pub session_id: SessionId,
    /// Receives all state-change notifications
    pub handler: Arc<dyn RoomEventHandler>,
    /// Result of the capability probe performed at initialize time
    pub screen_sharing_supported: bool,
}

/// Everything owned by a live session
pub struct ConnectedState {
    /// The configuration this connection was built from; restored on disconnect
    pub initialized: InitializedState,
    /// Live session handle
    pub session: Arc<dyn MediaSession>,
    /// Task draining the session's event stream into the manager
    pub pump: JoinHandle<()>,
    /// Camera publisher, if one is live
    pub camera: Option<CameraPublisher>,
    /// Screen publisher, if one is live
    pub screen: Option<ScreenPublisher>,
    /// Remote streams, ordered by arrival, unique by stream id
    pub streams: Vec<StreamInfo>,
    /// Remote connections, ordered by arrival, unique by connection id
    pub connections: Vec<ConnectionInfo>,
}

impl ConnectedState {
    /// Fold a stream-created event into the roster; duplicates by id are dropped
    pub fn add_stream(&mut self, stream: StreamInfo) {
        if !self.streams.iter().any(|s| s.id == stream.id) {
            self.streams.push(stream);
        }
    }

    /// Fold a stream-destroyed event into the roster
    pub fn remove_stream(&mut self, id: &StreamId) {
        self.streams.retain(|s| &s.id != id);
    }

    /// Fold a connection-created event into the roster; duplicates by id are dropped
    pub fn add_connection(&mut self, connection: ConnectionInfo) {
        if !self.connections.iter().any(|c| c.id == connection.id) {
            self.connections.push(connection);
        }
    }

    /// Fold a connection-destroyed event into the roster
    pub fn remove_connection(&mut self, id: &ConnectionId) {
        self.connections.retain(|c| &c.id != id);
    }
}

impl fmt::Debug for ConnectedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedState")
            .field("session_id", &self.initialized.session_id)
            .field("camera", &self.camera.is_some())
            .field("screen", &self.screen.is_some())
            .field("streams", &self.streams.len())
            .field("connections", &self.connections.len())
            .finish_non_exhaustive()
    }
}

/// A live camera publisher and the devices it was asked to capture
pub struct CameraPublisher {
    /// Selected camera, `None` when video is disabled
    pub video_device: Option<DeviceId>,
    /// Selected microphone, `None` when audio is disabled
    pub audio_device: Option<DeviceId>,
    /// The underlying publisher handle
    pub publisher: Arc<dyn MediaPublisher>,
    /// Task forwarding the publisher's stream-destroyed events
    pub watcher: JoinHandle<()>,
    /// Whether the publisher was created with a video track. A device change
    /// that would add a track the publisher never had requires a full
    /// republish; in-place source switching only works on existing tracks.
    pub published_with_video: bool,
    /// Whether the publisher was created with an audio track
    pub published_with_audio: bool,
}

impl CameraPublisher {
    /// Whether the requested devices exactly match the current selection
    pub fn matches(&self, video_device: &Option<DeviceId>, audio_device: &Option<DeviceId>) -> bool {
        &self.video_device == video_device && &self.audio_device == audio_device
    }

    /// Whether publishing the requested devices needs a new publisher
    pub fn needs_republish(
        &self,
        video_device: &Option<DeviceId>,
        audio_device: &Option<DeviceId>,
    ) -> bool {
        (!self.published_with_audio && audio_device.is_some())
            || (!self.published_with_video && video_device.is_some())
    }
}

/// A live screen publisher
pub struct ScreenPublisher {
    /// The underlying publisher handle
    pub publisher: Arc<dyn MediaPublisher>,
    /// Task forwarding the publisher's stream-destroyed events
    pub watcher: JoinHandle<()>,
}
