//! Screen publishing
//!
//! Simpler than the camera: a screen publisher has no device selection and
//! at most one may exist. Publish failures propagate after cleanup, the same
//! policy as the camera path.

use super::events::PublisherKind;
use super::RoomSessionManager;
use crate::error::{RoomError, RoomResult};
use crate::state::ScreenPublisher;
use colloq_backend_core::{ElementId, PublisherOptions, StreamDestroyedReason};

impl RoomSessionManager {
    /// Start sharing the screen into the session
    ///
    /// Fails with [`RoomError::ScreenAlreadyPublished`] if a screen publisher
    /// is live; the existing publisher is left untouched. On a create or
    /// publish failure the partial publisher is destroyed,
    /// `on_screen_stream_destroyed(MediaStopped)` is notified, and the error
    /// propagates.
    pub async fn publish_screen(&self, target: &ElementId) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("publish screen")?;
        if connected.screen.is_some() {
            return Err(RoomError::ScreenAlreadyPublished);
        }
        let session = connected.session.clone();
        let handler = connected.initialized.handler.clone();

        let options = PublisherOptions::screen()
            .with_resolution(self.config.screen_resolution)
            .with_insert_mode(self.config.insert_mode);

        let publisher = match self
            .bounded("screen publisher setup", self.backend.init_publisher(target, options))
            .await
        {
            Ok(publisher) => publisher,
            Err(e) => {
                handler
                    .on_screen_stream_destroyed(StreamDestroyedReason::MediaStopped)
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .bounded("screen publish", session.publish(publisher.clone()))
            .await
        {
            if let Err(destroy_err) = self
                .bounded("screen publisher destroy", publisher.destroy())
                .await
            {
                tracing::warn!(
                    "failed to destroy screen publisher after publish failure: {}",
                    destroy_err
                );
            }
            handler
                .on_screen_stream_destroyed(StreamDestroyedReason::MediaStopped)
                .await;
            return Err(e);
        }

        let watcher = self.spawn_publisher_watcher(PublisherKind::Screen, publisher.subscribe());
        connected.screen = Some(ScreenPublisher { publisher, watcher });
        handler.on_screen_stream_created().await;
        tracing::info!("screen publisher live");
        Ok(())
    }

    /// Stop sharing the screen
    ///
    /// Fails with [`RoomError::ScreenNotPublished`] if no screen publisher is
    /// live. Notifies `on_screen_stream_destroyed(Unpublished)`.
    pub async fn unpublish_screen(&self) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("unpublish screen")?;
        let Some(screen) = connected.screen.take() else {
            return Err(RoomError::ScreenNotPublished);
        };
        let session = connected.session.clone();
        let handler = connected.initialized.handler.clone();

        screen.watcher.abort();
        if let Err(e) = self
            .bounded("screen unpublish", session.unpublish(screen.publisher.clone()))
            .await
        {
            tracing::warn!("failed to unpublish screen: {}", e);
        }
        handler
            .on_screen_stream_destroyed(StreamDestroyedReason::Unpublished)
            .await;
        tracing::info!("screen publisher unpublished");
        Ok(())
    }
}
