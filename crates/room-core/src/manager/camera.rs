//! Camera publishing policy
//!
//! The interesting part of the publisher lifecycle: whether a device change
//! can be applied to the live publisher or needs a full republish. The
//! streaming SDKs only allow in-place source switching on tracks the
//! publisher was originally created with; enabling a track it never had
//! means tearing the publisher down and creating a new one.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::events::PublisherKind;
use super::RoomSessionManager;
use crate::error::RoomResult;
use crate::events::RoomEventHandler;
use crate::state::CameraPublisher;
use colloq_backend_core::{
    DeviceId, ElementId, MediaPublisher, MediaSession, PublisherOptions, StreamDestroyedReason,
};

enum CameraPlan {
    Republish,
    Switch,
    Fresh,
}

impl RoomSessionManager {
    /// Publish, retarget, or stop the camera publisher
    ///
    /// The requested device ids describe the desired end state, evaluated in
    /// order:
    ///
    /// 1. both `None` with a live camera: unpublish and destroy it, notify
    ///    `on_camera_stream_destroyed(MediaStopped)`; both `None` with no
    ///    camera is a silent no-op
    /// 2. ids identical to the current selection: no-op
    /// 3. a requested track the publisher was not created with: full
    ///    republish with the new device set, notify
    ///    `on_camera_stream_created`
    /// 4. both requested tracks already present: in-place source switch per
    ///    changed device, no notification
    /// 5. no live camera: create and publish, notify
    ///    `on_camera_stream_created`
    ///
    /// A failure while creating or publishing destroys the partial publisher,
    /// notifies `on_camera_stream_destroyed(MediaStopped)`, and propagates
    /// the error; the camera slot is left empty.
    pub async fn publish_camera(
        &self,
        target: &ElementId,
        video_device: Option<DeviceId>,
        audio_device: Option<DeviceId>,
    ) -> RoomResult<()> {
        let mut state = self.state.lock().await;
        let connected = state.connected_mut("publish camera")?;
        let session = connected.session.clone();
        let handler = connected.initialized.handler.clone();

        if video_device.is_none() && audio_device.is_none() {
            let Some(camera) = connected.camera.take() else {
                return Ok(());
            };
            camera.watcher.abort();
            if let Err(e) = self
                .bounded("camera unpublish", session.unpublish(camera.publisher.clone()))
                .await
            {
                tracing::warn!("failed to unpublish camera: {}", e);
            }
            if let Err(e) = self.bounded("camera destroy", camera.publisher.destroy()).await {
                tracing::warn!("failed to destroy camera publisher: {}", e);
            }
            handler
                .on_camera_stream_destroyed(StreamDestroyedReason::MediaStopped)
                .await;
            tracing::info!("camera publisher stopped");
            return Ok(());
        }

        let plan = match &connected.camera {
            Some(camera) if camera.matches(&video_device, &audio_device) => return Ok(()),
            Some(camera) if camera.needs_republish(&video_device, &audio_device) => {
                CameraPlan::Republish
            }
            Some(_) => CameraPlan::Switch,
            None => CameraPlan::Fresh,
        };

        match plan {
            CameraPlan::Switch => {
                let camera = connected
                    .camera
                    .as_mut()
                    .expect("switch plan implies a live camera");

                if audio_device != camera.audio_device {
                    match &audio_device {
                        Some(device) => {
                            self.bounded("audio source switch", camera.publisher.set_audio_source(device))
                                .await?;
                            self.bounded("audio enable", camera.publisher.set_audio_enabled(true))
                                .await?;
                        }
                        None => {
                            self.bounded("audio disable", camera.publisher.set_audio_enabled(false))
                                .await?;
                        }
                    }
                    camera.audio_device = audio_device.clone();
                }

                if video_device != camera.video_device {
                    match &video_device {
                        Some(device) => {
                            self.bounded("video source switch", camera.publisher.set_video_source(device))
                                .await?;
                            self.bounded("video enable", camera.publisher.set_video_enabled(true))
                                .await?;
                        }
                        None => {
                            self.bounded("video disable", camera.publisher.set_video_enabled(false))
                                .await?;
                        }
                    }
                    camera.video_device = video_device.clone();
                }

                tracing::info!(
                    "camera sources switched in place (video: {:?}, audio: {:?})",
                    camera.video_device.as_ref().map(DeviceId::as_str),
                    camera.audio_device.as_ref().map(DeviceId::as_str),
                );
                Ok(())
            }

            CameraPlan::Republish | CameraPlan::Fresh => {
                if let CameraPlan::Republish = plan {
                    let old = connected
                        .camera
                        .take()
                        .expect("republish plan implies a live camera");
                    old.watcher.abort();
                    if let Err(e) = self
                        .bounded("camera unpublish", session.unpublish(old.publisher.clone()))
                        .await
                    {
                        tracing::warn!("failed to unpublish camera before republish: {}", e);
                    }
                    if let Err(e) = self.bounded("camera destroy", old.publisher.destroy()).await {
                        tracing::warn!("failed to destroy camera publisher before republish: {}", e);
                    }
                }

                let (publisher, watcher) = self
                    .create_camera_publisher(&session, &handler, target, &video_device, &audio_device)
                    .await?;

                tracing::info!(
                    "camera publisher live (video: {:?}, audio: {:?})",
                    video_device.as_ref().map(DeviceId::as_str),
                    audio_device.as_ref().map(DeviceId::as_str),
                );
                connected.camera = Some(CameraPublisher {
                    published_with_video: video_device.is_some(),
                    published_with_audio: audio_device.is_some(),
                    video_device,
                    audio_device,
                    publisher,
                    watcher,
                });
                handler.on_camera_stream_created().await;
                Ok(())
            }
        }
    }

    /// Create and publish a camera publisher, cleaning up on failure
    async fn create_camera_publisher(
        &self,
        session: &Arc<dyn MediaSession>,
        handler: &Arc<dyn RoomEventHandler>,
        target: &ElementId,
        video_device: &Option<DeviceId>,
        audio_device: &Option<DeviceId>,
    ) -> RoomResult<(Arc<dyn MediaPublisher>, JoinHandle<()>)> {
        let options = PublisherOptions::camera(video_device.clone(), audio_device.clone())
            .with_resolution(self.config.camera_resolution)
            .with_insert_mode(self.config.insert_mode);

        let publisher = match self
            .bounded("camera publisher setup", self.backend.init_publisher(target, options))
            .await
        {
            Ok(publisher) => publisher,
            Err(e) => {
                handler
                    .on_camera_stream_destroyed(StreamDestroyedReason::MediaStopped)
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .bounded("camera publish", session.publish(publisher.clone()))
            .await
        {
            if let Err(destroy_err) = self
                .bounded("camera publisher destroy", publisher.destroy())
                .await
            {
                tracing::warn!(
                    "failed to destroy camera publisher after publish failure: {}",
                    destroy_err
                );
            }
            handler
                .on_camera_stream_destroyed(StreamDestroyedReason::MediaStopped)
                .await;
            return Err(e);
        }

        let watcher = self.spawn_publisher_watcher(PublisherKind::Camera, publisher.subscribe());
        Ok((publisher, watcher))
    }
}
