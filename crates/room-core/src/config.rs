//! Configuration for the room session manager

use serde::{Deserialize, Serialize};
use std::time::Duration;

use colloq_backend_core::{InsertMode, VideoResolution};

/// Configuration for a [`RoomSessionManager`](crate::RoomSessionManager)
///
/// All fields have working defaults; builder methods exist for the ones
/// hosts commonly adjust.
///
/// # Examples
///
/// ```rust
/// use colloq_room_core::RoomSessionConfig;
/// use std::time::Duration;
///
/// let config = RoomSessionConfig::new()
///     .with_operation_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.operation_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSessionConfig {
    /// Upper bound on any single external call (token fetch, connect,
    /// publish, device switch). Expiry fails the one operation with a
    /// timeout error instead of wedging the manager behind its lock.
    pub operation_timeout: Duration,
    /// Capture resolution for camera publishers
    pub camera_resolution: VideoResolution,
    /// Capture resolution for screen publishers
    pub screen_resolution: VideoResolution,
    /// How publisher views are mounted into their target elements
    pub insert_mode: InsertMode,
}

impl RoomSessionConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bound on external calls
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the camera capture resolution
    pub fn with_camera_resolution(mut self, resolution: VideoResolution) -> Self {
        self.camera_resolution = resolution;
        self
    }

    /// Set the screen capture resolution
    pub fn with_screen_resolution(mut self, resolution: VideoResolution) -> Self {
        self.screen_resolution = resolution;
        self
    }

    /// Set the publisher insert mode
    pub fn with_insert_mode(mut self, insert_mode: InsertMode) -> Self {
        self.insert_mode = insert_mode;
        self
    }
}

impl Default for RoomSessionConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(30),
            camera_resolution: VideoResolution::Hd720,
            screen_resolution: VideoResolution::Hd720,
            insert_mode: InsertMode::Append,
        }
    }
}
