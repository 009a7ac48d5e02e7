//! Backend event adaptation
//!
//! The backend delivers events on its own schedule; the pump and watcher
//! tasks here fold them into manager state through the same lock the public
//! operations use, so an event can never observe or produce a half-finished
//! transition. Precondition violations (an event arriving for a state that
//! cannot accept it) are reported in the log, not panics: they happen
//! legitimately when an event races a caller-initiated teardown.

use std::fmt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::RoomSessionManager;
use crate::error::{RoomError, RoomResult};
use crate::state::{RoomState, RoomStateKind};
use colloq_backend_core::{
    ConnectionInfo, PublisherEvent, SessionEvent, StreamDestroyedReason, StreamInfo,
};

/// Which publisher a watcher task is watching
#[derive(Debug, Clone, Copy)]
pub(crate) enum PublisherKind {
    Camera,
    Screen,
}

impl fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Camera => "camera",
            Self::Screen => "screen",
        })
    }
}

impl RoomSessionManager {
    /// Spawn the task that drains a session's event stream into the manager
    ///
    /// The pump holds only a weak reference: dropping the manager stops it.
    /// It also stops itself after a disconnected event, since the adapter for
    /// that event retires the connected state the pump belongs to.
    pub(crate) fn spawn_event_pump(
        &self,
        mut events: broadcast::Receiver<SessionEvent>,
    ) -> JoinHandle<()> {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("session event stream lagged, {} events missed", missed);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(manager) = weak.upgrade() else { break };
                let last = matches!(event, SessionEvent::Disconnected { .. });
                if let Err(e) = manager.handle_session_event(event).await {
                    tracing::warn!("session event dropped: {}", e);
                }
                if last {
                    break;
                }
            }
            tracing::debug!("session event pump stopped");
        })
    }

    /// Spawn the task that forwards one publisher's stream-destroyed events
    pub(crate) fn spawn_publisher_watcher(
        &self,
        kind: PublisherKind,
        mut events: broadcast::Receiver<PublisherEvent>,
    ) -> JoinHandle<()> {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(PublisherEvent::StreamDestroyed { reason }) => {
                        let Some(manager) = weak.upgrade() else { break };
                        manager.on_publisher_stream_destroyed(kind, reason).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Dispatch one session event to its adapter
    pub(crate) async fn handle_session_event(&self, event: SessionEvent) -> RoomResult<()> {
        match event {
            SessionEvent::StreamCreated(info) => self.on_stream_created(info).await,
            SessionEvent::StreamDestroyed(info) => self.on_stream_destroyed(info).await,
            SessionEvent::ConnectionCreated(info) => self.on_connection_created(info).await,
            SessionEvent::ConnectionDestroyed(info) => self.on_connection_destroyed(info).await,
            SessionEvent::Connected => self.on_session_connected_event().await,
            SessionEvent::Disconnected { reason } => {
                self.on_session_disconnected_event(reason).await
            }
        }
    }

    async fn on_stream_created(&self, info: StreamInfo) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("stream created event")?;
        tracing::debug!("remote stream {} created", info.id);
        connected.add_stream(info);
        let streams = connected.streams.clone();
        let handler = connected.initialized.handler.clone();
        handler.on_streams_changed(streams).await;
        Ok(())
    }

    async fn on_stream_destroyed(&self, info: StreamInfo) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("stream destroyed event")?;
        tracing::debug!("remote stream {} destroyed", info.id);
        connected.remove_stream(&info.id);
        let streams = connected.streams.clone();
        let handler = connected.initialized.handler.clone();
        handler.on_streams_changed(streams).await;
        Ok(())
    }

    async fn on_connection_created(&self, info: ConnectionInfo) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("connection created event")?;
        tracing::debug!("remote connection {} created", info.id);
        connected.add_connection(info);
        let connections = connected.connections.clone();
        let handler = connected.initialized.handler.clone();
        handler.on_connections_changed(connections).await;
        Ok(())
    }

    async fn on_connection_destroyed(&self, info: ConnectionInfo) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("connection destroyed event")?;
        tracing::debug!("remote connection {} destroyed", info.id);
        connected.remove_connection(&info.id);
        let connections = connected.connections.clone();
        let handler = connected.initialized.handler.clone();
        handler.on_connections_changed(connections).await;
        Ok(())
    }

    /// The service confirmed the local connection; may arrive while the
    /// connect critical section is still transitioning the state, so any
    /// configured variant is acceptable
    async fn on_session_connected_event(&self) -> RoomResult<()> {
        let state = self.state.lock().await;
        let Some(handler) = state.handler() else {
            return Err(RoomError::invalid_transition(
                "session connected event",
                "initialized or connected",
                RoomStateKind::Uninitialized,
            ));
        };
        handler.on_session_connected(true).await;
        Ok(())
    }

    /// The service ended the session from its side: release local publisher
    /// handles and restore the initialized configuration, exactly as a
    /// caller-initiated disconnect would
    async fn on_session_disconnected_event(&self, reason: Option<String>) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        if !matches!(&*state, RoomState::Connected(_)) {
            return Err(RoomError::invalid_transition(
                "session disconnected event",
                "connected",
                state.kind(),
            ));
        }
        let RoomState::Connected(mut connected) =
            std::mem::replace(&mut *state, RoomState::Uninitialized)
        else {
            unreachable!("variant checked above");
        };

        // The session itself is already gone; only local handles remain.
        if let Some(camera) = connected.camera.take() {
            camera.watcher.abort();
            if let Err(e) = self.bounded("camera destroy", camera.publisher.destroy()).await {
                tracing::warn!("failed to destroy camera publisher after session loss: {}", e);
            }
        }
        if let Some(screen) = connected.screen.take() {
            screen.watcher.abort();
            if let Err(e) = self.bounded("screen destroy", screen.publisher.destroy()).await {
                tracing::warn!("failed to destroy screen publisher after session loss: {}", e);
            }
        }

        // The pump is not aborted here: this adapter runs on it, and the
        // pump exits on its own after a disconnected event.
        let session_id = connected.initialized.session_id.clone();
        let handler = connected.initialized.handler.clone();
        *state = RoomState::Initialized(connected.initialized);
        handler.on_session_connected(false).await;
        tracing::info!(
            "session {} disconnected by the service ({})",
            session_id,
            reason.as_deref().unwrap_or("no reason given")
        );
        Ok(())
    }

    /// A publisher's own stream stopped; forward the reason to the handler
    async fn on_publisher_stream_destroyed(
        &self,
        kind: PublisherKind,
        reason: StreamDestroyedReason,
    ) {
        let state = self.state.lock().await;
        let Some(handler) = state.handler() else {
            tracing::debug!("{} stream destroyed ({}) before initialization, ignoring", kind, reason);
            return;
        };
        match kind {
            PublisherKind::Camera => handler.on_camera_stream_destroyed(reason).await,
            PublisherKind::Screen => handler.on_screen_stream_destroyed(reason).await,
        }
    }
}
