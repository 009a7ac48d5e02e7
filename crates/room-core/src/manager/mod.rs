//! The room session manager
//!
//! Split across focused files the way the operations group:
//! session lifecycle here, camera publishing in `camera.rs`, screen
//! publishing in `screen.rs`, and the backend event adapters in `events.rs`.

mod camera;
mod events;
mod screen;

use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::config::RoomSessionConfig;
use crate::error::{RoomError, RoomResult};
use crate::events::RoomEventHandler;
use crate::state::{ConnectedState, InitializedState, RoomState, RoomStateKind};
use crate::token::TokenProvider;
use colloq_backend_core::{
    ConnectionInfo, MediaBackend, MediaPublisher, SessionId, StreamInfo,
};

/// Coordinates one room's real-time media session
///
/// Owns the lifecycle of a single session against the streaming backend:
///
/// ```text
/// ┌─────────────────────────┐
/// │   Hosting UI layer      │
/// └───────────┬─────────────┘
///             │ initialize / connect / publish / disconnect
/// ┌───────────▼─────────────┐
/// │   RoomSessionManager    │ ◄── This Layer
/// │ ┌─────────────────────┐ │
/// │ │ State machine       │ │  • uninitialized → initialized → connected
/// │ │ Publisher lifecycle │ │  • camera republish vs in-place switch
/// │ │ Roster tracking     │ │  • streams/connections, unique by id
/// │ │ Event adaptation    │ │  • backend events → handler notifications
/// │ └─────────────────────┘ │
/// └───────────┬─────────────┘
///             │ MediaBackend / MediaSession / MediaPublisher
/// ┌───────────▼─────────────┐
/// │   Streaming backend     │
/// └─────────────────────────┘
/// ```
///
/// Every public operation and every backend event adapter serializes through
/// one internal lock, so state transitions are atomic with respect to each
/// other: a `publish_camera` call can never interleave with a
/// stream-destroyed event mid-transition. The lock is held across the awaits
/// inside a critical section; each external call is individually bounded by
/// [`RoomSessionConfig::operation_timeout`] so a hung backend fails one
/// operation instead of wedging the manager.
///
/// The hosting layer owns the `Arc<RoomSessionManager>` returned by
/// [`new`](RoomSessionManager::new); there is no global instance. Background
/// tasks spawned by the manager hold only weak references to it.
///
/// # Examples
///
/// ```rust,no_run
/// use colloq_room_core::{RoomSessionConfig, RoomSessionManager, RoomEventHandler};
/// use colloq_backend_core::{ElementId, DeviceId, MediaBackend, SessionId};
/// use std::sync::Arc;
///
/// # async fn example(backend: Arc<dyn MediaBackend>,
/// #                  handler: Arc<dyn RoomEventHandler>) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = RoomSessionManager::new(backend, RoomSessionConfig::default());
///
/// let provider = |session_id: SessionId| async move {
///     // ask the conference service for a token
///     Ok::<_, colloq_room_core::RoomError>(format!("token-for-{session_id}"))
/// };
/// manager
///     .initialize(Arc::new(provider), SessionId::new("room-42"), handler)
///     .await?;
/// manager.connect().await?;
/// manager
///     .publish_camera(
///         &ElementId::new("camera-preview"),
///         Some(DeviceId::new("front-camera")),
///         Some(DeviceId::new("headset-mic")),
///     )
///     .await?;
/// // ... the session runs ...
/// manager.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct RoomSessionManager {
    /// The streaming backend this manager drives
    pub(crate) backend: Arc<dyn MediaBackend>,
    /// Host-supplied configuration
    pub(crate) config: RoomSessionConfig,
    /// The single field of truth; every operation locks it first
    pub(crate) state: Mutex<RoomState>,
    /// Handle to self for the event pump and publisher watcher tasks
    pub(crate) weak: Weak<RoomSessionManager>,
}

impl RoomSessionManager {
    /// Create a manager for one room, starting uninitialized
    pub fn new(backend: Arc<dyn MediaBackend>, config: RoomSessionConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            backend,
            config,
            state: Mutex::new(RoomState::Uninitialized),
            weak: weak.clone(),
        })
    }

    /// Configure the manager for a session
    ///
    /// Probes the backend's screen-sharing capability and stores it together
    /// with the token provider and notification handler. May be called again
    /// to reconfigure while not connected; re-initializing a live session is
    /// an invalid transition — disconnect first.
    pub async fn initialize(
        &self,
        token_provider: Arc<dyn TokenProvider>,
        session_id: SessionId,
        handler: Arc<dyn RoomEventHandler>,
    ) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        if let RoomState::Connected(_) = &*state {
            return Err(RoomError::invalid_transition(
                "initialize",
                "uninitialized or initialized",
                RoomStateKind::Connected,
            ));
        }

        // The probe has no failure path the caller can act on: a backend
        // that cannot answer is a backend that cannot share the screen.
        let screen_sharing_supported = match self
            .bounded("screen share capability probe", self.backend.screen_share_capability())
            .await
        {
            Ok(capability) => capability.is_available(),
            Err(e) => {
                tracing::warn!("screen share capability probe failed, treating as unsupported: {}", e);
                false
            }
        };

        tracing::info!(
            "initialized for session {} (screen sharing supported: {})",
            session_id,
            screen_sharing_supported
        );
        *state = RoomState::Initialized(InitializedState {
            token_provider,
            session_id,
            handler,
            screen_sharing_supported,
        });
        Ok(())
    }

    /// Connect to the configured session
    ///
    /// Creates the session handle, subscribes to its events (so nothing
    /// raised during connection establishment is lost), fetches a token from
    /// the provider, connects, and transitions to the connected state with
    /// empty publisher slots and rosters. On failure the state stays
    /// initialized and the error propagates.
    pub async fn connect(&self) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let init = match &*state {
            RoomState::Initialized(init) => init.clone(),
            other => {
                return Err(RoomError::invalid_transition(
                    "connect",
                    "initialized",
                    other.kind(),
                ))
            }
        };

        let session = self
            .bounded("session setup", self.backend.init_session(&init.session_id))
            .await?;
        let events = session.subscribe();

        let token = self
            .bounded("token fetch", init.token_provider.token(&init.session_id))
            .await?;
        self.bounded("session connect", session.connect(&token))
            .await?;

        let pump = self.spawn_event_pump(events);
        let session_id = init.session_id.clone();
        *state = RoomState::Connected(ConnectedState {
            initialized: init,
            session,
            pump,
            camera: None,
            screen: None,
            streams: Vec::new(),
            connections: Vec::new(),
        });
        tracing::info!("connected to session {}", session_id);
        Ok(())
    }

    /// Disconnect from the session and restore the initialized configuration
    ///
    /// Tears down any live camera and screen publisher, stops the event pump,
    /// disconnects the session, restores the exact configuration stored at
    /// initialize time, and notifies the handler with
    /// `on_session_connected(false)`. Teardown of individual resources is
    /// best-effort: a publisher that fails to unpublish is logged, not fatal.
    pub async fn disconnect(&self) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        if !matches!(&*state, RoomState::Connected(_)) {
            return Err(RoomError::invalid_transition(
                "disconnect",
                "connected",
                state.kind(),
            ));
        }
        let RoomState::Connected(mut connected) =
            std::mem::replace(&mut *state, RoomState::Uninitialized)
        else {
            unreachable!("variant checked above");
        };

        if let Some(camera) = connected.camera.take() {
            camera.watcher.abort();
            if let Err(e) = self
                .bounded("camera unpublish", connected.session.unpublish(camera.publisher.clone()))
                .await
            {
                tracing::warn!("failed to unpublish camera during disconnect: {}", e);
            }
            if let Err(e) = self.bounded("camera destroy", camera.publisher.destroy()).await {
                tracing::warn!("failed to destroy camera publisher during disconnect: {}", e);
            }
        }

        if let Some(screen) = connected.screen.take() {
            screen.watcher.abort();
            if let Err(e) = self
                .bounded("screen unpublish", connected.session.unpublish(screen.publisher.clone()))
                .await
            {
                tracing::warn!("failed to unpublish screen during disconnect: {}", e);
            }
            if let Err(e) = self.bounded("screen destroy", screen.publisher.destroy()).await {
                tracing::warn!("failed to destroy screen publisher during disconnect: {}", e);
            }
        }

        // Stop draining events before disconnecting, the same way listeners
        // come off before the session goes down.
        connected.pump.abort();
        if let Err(e) = self
            .bounded("session disconnect", connected.session.disconnect())
            .await
        {
            tracing::warn!("session disconnect reported an error: {}", e);
        }

        let session_id = connected.initialized.session_id.clone();
        let handler = connected.initialized.handler.clone();
        *state = RoomState::Initialized(connected.initialized);
        handler.on_session_connected(false).await;
        tracing::info!("disconnected from session {}", session_id);
        Ok(())
    }

    /// Which state variant is currently live
    pub async fn state_kind(&self) -> RoomStateKind {
        self.state.lock().await.kind()
    }

    /// Whether the manager currently holds a live session
    pub async fn is_connected(&self) -> bool {
        matches!(&*self.state.lock().await, RoomState::Connected(_))
    }

    /// The live camera publisher handle, `None` when absent or not connected
    pub async fn camera_publisher(&self) -> Option<Arc<dyn MediaPublisher>> {
        match &*self.state.lock().await {
            RoomState::Connected(connected) => {
                connected.camera.as_ref().map(|c| c.publisher.clone())
            }
            _ => None,
        }
    }

    /// The live screen publisher handle, `None` when absent or not connected
    pub async fn screen_publisher(&self) -> Option<Arc<dyn MediaPublisher>> {
        match &*self.state.lock().await {
            RoomState::Connected(connected) => {
                connected.screen.as_ref().map(|s| s.publisher.clone())
            }
            _ => None,
        }
    }

    /// Whether the environment supports screen sharing
    ///
    /// `false` until `initialize` has run the capability probe.
    pub async fn screen_sharing_supported(&self) -> bool {
        match &*self.state.lock().await {
            RoomState::Uninitialized => false,
            RoomState::Initialized(init) => init.screen_sharing_supported,
            RoomState::Connected(connected) => connected.initialized.screen_sharing_supported,
        }
    }

    /// Snapshot of the remote stream roster; empty when not connected
    pub async fn streams(&self) -> Vec<StreamInfo> {
        match &*self.state.lock().await {
            RoomState::Connected(connected) => connected.streams.clone(),
            _ => Vec::new(),
        }
    }

    /// Snapshot of the remote connection roster; empty when not connected
    pub async fn connections(&self) -> Vec<ConnectionInfo> {
        match &*self.state.lock().await {
            RoomState::Connected(connected) => connected.connections.clone(),
            _ => Vec::new(),
        }
    }

    /// Run an external call under the configured operation timeout
    pub(crate) async fn bounded<T, E>(
        &self,
        operation: &'static str,
        fut: impl std::future::Future<Output = Result<T, E>>,
    ) -> RoomResult<T>
    where
        E: Into<RoomError>,
    {
        match tokio::time::timeout(self.config.operation_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(RoomError::timeout(operation, self.config.operation_timeout)),
        }
    }
}
