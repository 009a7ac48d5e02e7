//! Data types crossing the streaming backend boundary
//!
//! Identifiers are newtype strings because every id in this domain is minted
//! by the external streaming service (or by the host UI, for element ids) and
//! is opaque to us. The descriptor structs (`StreamInfo`, `ConnectionInfo`)
//! mirror what the backend reports about remote participants; they carry
//! serde derives so hosting layers can forward them over whatever transport
//! they use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a media session, minted by the streaming service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session id from a service-issued string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a remote participant's published stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    /// Create a stream id from a service-issued string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a remote participant's signaling connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a connection id from a service-issued string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a local capture device (camera or microphone)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id from a host-reported string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the host-UI element a publisher renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Create an element id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a local publisher handle
///
/// Unlike the other ids this one is minted locally when a publisher is
/// created, since the backend only assigns a stream id once publishing
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublisherId(String);

impl PublisherId {
    /// Create a publisher id from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh publisher id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor of a remote participant's published stream
///
/// One entry of the stream roster. A stream is the participant's published
/// audio/video track set; it exists independently of how (or whether) the
/// hosting UI renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Stream id assigned by the streaming service
    pub id: StreamId,
    /// Connection the stream was published over
    pub connection_id: ConnectionId,
    /// Display name attached by the publishing participant, if any
    pub name: Option<String>,
    /// Whether the stream currently carries audio
    pub has_audio: bool,
    /// Whether the stream currently carries video
    pub has_video: bool,
    /// When the stream was created, as reported by the backend
    pub created_at: DateTime<Utc>,
}

/// Descriptor of a remote participant's signaling connection
///
/// Connections exist for every participant in the session whether or not
/// they publish media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection id assigned by the streaming service
    pub id: ConnectionId,
    /// Opaque application data attached at token-issue time, if any
    pub data: Option<String>,
    /// When the connection was established, as reported by the backend
    pub created_at: DateTime<Utc>,
}

/// Capture resolution requested for a publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoResolution {
    /// 320x240
    Qvga,
    /// 640x480
    Vga,
    /// 1280x720
    Hd720,
    /// 1920x1080
    Hd1080,
}

impl VideoResolution {
    /// The wire representation expected by streaming SDKs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qvga => "320x240",
            Self::Vga => "640x480",
            Self::Hd720 => "1280x720",
            Self::Hd1080 => "1920x1080",
        }
    }
}

impl Default for VideoResolution {
    fn default() -> Self {
        Self::Hd720
    }
}

impl fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the backend mounts the publisher's view into the target element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertMode {
    /// Append as a child of the target element
    Append,
    /// Replace the contents of the target element
    Replace,
    /// Insert before the target element
    Before,
    /// Insert after the target element
    After,
}

impl Default for InsertMode {
    fn default() -> Self {
        Self::Append
    }
}

/// What a publisher captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoSource {
    /// A camera device
    Camera,
    /// The participant's screen
    Screen,
}

/// One sizing dimension of a publisher's view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// Percentage of the target element
    Percent(u16),
    /// Absolute pixels
    Pixels(u32),
}

impl Default for Dimension {
    fn default() -> Self {
        Self::Percent(100)
    }
}

/// Options for creating a publisher
///
/// The defaults match what the conference UI publishes with: 720p capture
/// filling the target element, appended into it, with the SDK's built-in
/// controls hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherOptions {
    /// Whether to publish an audio track
    pub publish_audio: bool,
    /// Whether to publish a video track
    pub publish_video: bool,
    /// Microphone to capture from; `None` leaves the choice to the backend
    pub audio_device: Option<DeviceId>,
    /// Camera to capture from; ignored for screen publishers
    pub video_device: Option<DeviceId>,
    /// Camera capture or screen capture
    pub video_source: VideoSource,
    /// Requested capture resolution
    pub resolution: VideoResolution,
    /// View width within the target element
    pub width: Dimension,
    /// View height within the target element
    pub height: Dimension,
    /// How the view is mounted into the target element
    pub insert_mode: InsertMode,
    /// Whether the SDK renders its built-in controls
    pub show_controls: bool,
}

impl PublisherOptions {
    /// Options for a camera publisher
    ///
    /// The audio/video publish flags are derived from which device ids are
    /// present, matching how the session layer decides what a camera
    /// publisher carries.
    pub fn camera(video_device: Option<DeviceId>, audio_device: Option<DeviceId>) -> Self {
        Self {
            publish_audio: audio_device.is_some(),
            publish_video: video_device.is_some(),
            audio_device,
            video_device,
            video_source: VideoSource::Camera,
            resolution: VideoResolution::default(),
            width: Dimension::default(),
            height: Dimension::default(),
            insert_mode: InsertMode::default(),
            show_controls: false,
        }
    }

    /// Options for a screen publisher (video only, no capture devices)
    pub fn screen() -> Self {
        Self {
            publish_audio: false,
            publish_video: true,
            audio_device: None,
            video_device: None,
            video_source: VideoSource::Screen,
            resolution: VideoResolution::default(),
            width: Dimension::default(),
            height: Dimension::default(),
            insert_mode: InsertMode::default(),
            show_controls: false,
        }
    }

    /// Set the capture resolution
    pub fn with_resolution(mut self, resolution: VideoResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the insert mode
    pub fn with_insert_mode(mut self, insert_mode: InsertMode) -> Self {
        self.insert_mode = insert_mode;
        self
    }

    /// Set the view size
    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Result of the screen-sharing capability probe
///
/// `extension_registered` is `None` when the browser needs no extension for
/// screen capture; only an explicit `Some(false)` makes sharing unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenShareCapability {
    /// Whether the environment supports screen capture at all
    pub supported: bool,
    /// Whether the required browser extension is registered, if one is needed
    pub extension_registered: Option<bool>,
}

impl ScreenShareCapability {
    /// Whether screen sharing can actually be offered
    pub fn is_available(&self) -> bool {
        self.supported && self.extension_registered != Some(false)
    }
}

/// Why a published stream stopped
///
/// The two locally-originated reasons have fixed wire strings; everything the
/// SDK reports on its own (network drops, forced unpublish by a moderator)
/// comes through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamDestroyedReason {
    /// The local user stopped the media source
    MediaStopped,
    /// The publisher was explicitly unpublished
    Unpublished,
    /// A reason reported by the streaming service
    Other(String),
}

impl StreamDestroyedReason {
    /// The wire representation of the reason
    pub fn as_str(&self) -> &str {
        match self {
            Self::MediaStopped => "mediaStopped",
            Self::Unpublished => "unpublished",
            Self::Other(reason) => reason,
        }
    }

    /// Parse a wire reason string
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "mediaStopped" => Self::MediaStopped,
            "unpublished" => Self::Unpublished,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StreamDestroyedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_options_derive_publish_flags_from_devices() {
        let both = PublisherOptions::camera(
            Some(DeviceId::new("cam-1")),
            Some(DeviceId::new("mic-1")),
        );
        assert!(both.publish_video);
        assert!(both.publish_audio);

        let video_only = PublisherOptions::camera(Some(DeviceId::new("cam-1")), None);
        assert!(video_only.publish_video);
        assert!(!video_only.publish_audio);
        assert_eq!(video_only.resolution.as_str(), "1280x720");
        assert_eq!(video_only.insert_mode, InsertMode::Append);
        assert!(!video_only.show_controls);
    }

    #[test]
    fn screen_options_are_video_only() {
        let options = PublisherOptions::screen();
        assert_eq!(options.video_source, VideoSource::Screen);
        assert!(options.publish_video);
        assert!(!options.publish_audio);
        assert!(options.audio_device.is_none());
        assert!(options.video_device.is_none());
    }

    #[test]
    fn capability_requires_support_and_extension() {
        let no_extension_needed = ScreenShareCapability {
            supported: true,
            extension_registered: None,
        };
        assert!(no_extension_needed.is_available());

        let extension_missing = ScreenShareCapability {
            supported: true,
            extension_registered: Some(false),
        };
        assert!(!extension_missing.is_available());

        let unsupported = ScreenShareCapability {
            supported: false,
            extension_registered: Some(true),
        };
        assert!(!unsupported.is_available());
    }

    #[test]
    fn destroyed_reason_wire_round_trip() {
        assert_eq!(
            StreamDestroyedReason::from_wire("mediaStopped"),
            StreamDestroyedReason::MediaStopped
        );
        assert_eq!(StreamDestroyedReason::Unpublished.as_str(), "unpublished");
        let other = StreamDestroyedReason::from_wire("networkDisconnected");
        assert_eq!(other, StreamDestroyedReason::Other("networkDisconnected".into()));
        assert_eq!(other.as_str(), "networkDisconnected");
    }

    #[test]
    fn stream_info_serializes() {
        let info = StreamInfo {
            id: StreamId::new("stream-1"),
            connection_id: ConnectionId::new("conn-1"),
            name: Some("Alice".to_string()),
            has_audio: true,
            has_video: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&info).expect("serialize");
        let back: StreamInfo = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, info);
    }
}
