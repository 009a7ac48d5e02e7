//! Notification callbacks from the session manager to the hosting layer
//!
//! The hosting UI registers one [`RoomEventHandler`] at initialize time and
//! receives every observable state change through it: roster updates,
//! session connectivity, and publisher lifecycle. All methods have no-op
//! defaults so a host only implements what it renders.

use async_trait::async_trait;

use colloq_backend_core::{ConnectionInfo, StreamDestroyedReason, StreamInfo};

/// Receives state-change notifications from a
/// [`RoomSessionManager`](crate::RoomSessionManager)
///
/// Handler methods are invoked while the manager's internal lock is held, so
/// state observed via the manager's accessors from inside a handler would
/// deadlock — handlers should capture what they need from the notification
/// payload and return promptly.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use colloq_room_core::RoomEventHandler;
/// use colloq_backend_core::StreamInfo;
///
/// struct RosterLogger;
///
/// #[async_trait]
/// impl RoomEventHandler for RosterLogger {
///     async fn on_streams_changed(&self, streams: Vec<StreamInfo>) {
///         println!("{} remote streams", streams.len());
///     }
///
///     async fn on_session_connected(&self, connected: bool) {
///         println!("session connected: {connected}");
///     }
/// }
/// ```
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    /// The remote stream roster changed; `streams` is the full updated set
    async fn on_streams_changed(&self, streams: Vec<StreamInfo>) {
        let _ = streams;
    }

    /// The remote connection roster changed; `connections` is the full updated set
    async fn on_connections_changed(&self, connections: Vec<ConnectionInfo>) {
        let _ = connections;
    }

    /// The session connected (`true`) or disconnected (`false`)
    async fn on_session_connected(&self, connected: bool) {
        let _ = connected;
    }

    /// A camera publisher started publishing
    async fn on_camera_stream_created(&self) {}

    /// The camera publisher's stream stopped
    async fn on_camera_stream_destroyed(&self, reason: StreamDestroyedReason) {
        let _ = reason;
    }

    /// A screen publisher started publishing
    async fn on_screen_stream_created(&self) {}

    /// The screen publisher's stream stopped
    async fn on_screen_stream_destroyed(&self, reason: StreamDestroyedReason) {
        let _ = reason;
    }
}
